//! Sidebar unread badges.
//!
//! One live subscription per known peer stream keeps every badge current
//! while the user is viewing a different conversation. Listener fan-out is
//! proportional to roster size; acceptable here, a pre-aggregated
//! server-side counter would replace it at larger rosters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::warn;

use chatup_shared::{Message, Profile, ReadWatermark, StreamId, SubscriptionError, UserId};
use chatup_store::{ChatStore, Subscription};

use crate::events::{emit, ClientEvent, EventSink};

/// Live unread counts for every known peer.
pub struct UnreadAggregator {
    inner: Arc<Mutex<UnreadInner>>,
    _watermarks_sub: Subscription,
    _profiles_sub: Subscription,
}

#[derive(Default)]
struct UnreadInner {
    /// Peer owning each tracked stream. Presence of a key marks the stream
    /// as tracked, even while its message subscription is still being set
    /// up.
    peer_of: HashMap<StreamId, UserId>,
    messages: HashMap<StreamId, Vec<Message>>,
    watermarks: HashMap<StreamId, DateTime<Utc>>,
    subs: HashMap<StreamId, Subscription>,
    counts: HashMap<UserId, usize>,
}

impl UnreadAggregator {
    /// Subscribe to the watermark feed and the roster; message
    /// subscriptions follow the roster as peers appear.
    pub fn start(
        store: Arc<dyn ChatStore>,
        self_id: UserId,
        window: usize,
        events: EventSink,
    ) -> Result<Self, SubscriptionError> {
        let inner = Arc::new(Mutex::new(UnreadInner::default()));

        // Watermark feed first, so marks replayed with the roster are not
        // missed.
        let watermark_inner = inner.clone();
        let watermark_events = events.clone();
        let watermarks_sub = store.subscribe_watermarks(
            &self_id,
            Arc::new(move |mark: &ReadWatermark| {
                let Ok(mut state) = watermark_inner.lock() else {
                    return;
                };
                state
                    .watermarks
                    .insert(mark.stream_id.clone(), mark.last_read_at);
                if let Some(peer) = state.peer_of.get(&mark.stream_id).cloned() {
                    recompute(&mut state, &mark.stream_id, &peer, &watermark_events);
                }
            }),
        )?;

        let roster_inner = inner.clone();
        let roster_store = store.clone();
        let roster_events = events.clone();
        let roster_self = self_id.clone();
        let profiles_sub = store.subscribe_profiles(Arc::new(move |profiles: &[Profile]| {
            sync_roster(
                &roster_store,
                &roster_inner,
                &roster_self,
                window,
                &roster_events,
                profiles,
            );
        }))?;

        Ok(Self {
            inner,
            _watermarks_sub: watermarks_sub,
            _profiles_sub: profiles_sub,
        })
    }

    /// Current badge for one peer. Zero when unknown.
    pub fn count_for(&self, peer: &UserId) -> usize {
        self.inner
            .lock()
            .map(|state| state.counts.get(peer).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn counts(&self) -> HashMap<UserId, usize> {
        self.inner
            .lock()
            .map(|state| state.counts.clone())
            .unwrap_or_default()
    }
}

/// Align the tracked streams with the roster: subscribe new peers, tear
/// down departed ones.
fn sync_roster(
    store: &Arc<dyn ChatStore>,
    inner: &Arc<Mutex<UnreadInner>>,
    self_id: &UserId,
    window: usize,
    events: &EventSink,
    profiles: &[Profile],
) {
    let wanted: HashMap<StreamId, UserId> = profiles
        .iter()
        .filter(|profile| &profile.id != self_id)
        .map(|profile| {
            (
                StreamId::direct(self_id, &profile.id),
                profile.id.clone(),
            )
        })
        .collect();

    // Work out the delta under the lock; subscribe and tear down outside
    // it, because both paths re-enter listener callbacks.
    let (additions, removed_subs) = {
        let Ok(mut state) = inner.lock() else {
            return;
        };

        let departed: Vec<StreamId> = state
            .peer_of
            .keys()
            .filter(|stream| !wanted.contains_key(*stream))
            .cloned()
            .collect();
        let mut removed_subs = Vec::with_capacity(departed.len());
        for stream in departed {
            if let Some(peer) = state.peer_of.remove(&stream) {
                state.counts.remove(&peer);
            }
            state.messages.remove(&stream);
            if let Some(sub) = state.subs.remove(&stream) {
                removed_subs.push(sub);
            }
        }

        let additions: Vec<(StreamId, UserId)> = wanted
            .iter()
            .filter(|(stream, _)| !state.peer_of.contains_key(*stream))
            .map(|(stream, peer)| (stream.clone(), peer.clone()))
            .collect();
        for (stream, peer) in &additions {
            state.peer_of.insert(stream.clone(), peer.clone());
        }

        (additions, removed_subs)
    };
    drop(removed_subs);

    for (stream, peer) in additions {
        let listener_inner = inner.clone();
        let listener_events = events.clone();
        let listener_stream = stream.clone();
        let result = store.subscribe_messages(
            &stream,
            window,
            Arc::new(move |messages: &[Message]| {
                let Ok(mut state) = listener_inner.lock() else {
                    return;
                };
                let Some(peer) = state.peer_of.get(&listener_stream).cloned() else {
                    return;
                };
                state
                    .messages
                    .insert(listener_stream.clone(), messages.to_vec());
                recompute(&mut state, &listener_stream, &peer, &listener_events);
            }),
        );

        match result {
            Ok(sub) => {
                if let Ok(mut state) = inner.lock() {
                    if state.peer_of.contains_key(&stream) {
                        state.subs.insert(stream, sub);
                    }
                }
            }
            Err(e) => {
                warn!(peer = %peer, stream = %stream, error = %e, "unread feed failed");
            }
        }
    }
}

/// Count messages above the stream's watermark and publish the badge when
/// it moved. An unset watermark reads as epoch zero, so a never-opened
/// conversation counts its whole window.
fn recompute(state: &mut UnreadInner, stream: &StreamId, peer: &UserId, events: &EventSink) {
    let watermark = state
        .watermarks
        .get(stream)
        .copied()
        .unwrap_or(DateTime::UNIX_EPOCH);
    let count = state
        .messages
        .get(stream)
        .map(|messages| {
            messages
                .iter()
                .filter(|message| message.sent_at > watermark)
                .count()
        })
        .unwrap_or(0);

    let previous = state.counts.insert(peer.clone(), count).unwrap_or(0);
    if previous != count {
        emit(
            events,
            ClientEvent::UnreadChanged {
                peer: peer.clone(),
                count,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatup_shared::NewMessage;
    use chatup_store::MemoryChatStore;

    fn profile(id: &str, username: &str) -> Profile {
        Profile {
            id: UserId::new(id),
            username: username.to_string(),
            full_name: username.to_string(),
            email: format!("{username}@example.com"),
        }
    }

    fn new_message(sender: &str, text: &str) -> NewMessage {
        NewMessage {
            text: text.to_string(),
            sender_id: UserId::new(sender),
            sender_username: sender.to_string(),
            sender_full_name: sender.to_string(),
        }
    }

    #[tokio::test]
    async fn never_opened_conversation_counts_its_full_history() {
        let store = MemoryChatStore::new();
        let me = UserId::new("me");
        let bob = UserId::new("bob-uid");
        let stream = StreamId::direct(&me, &bob);

        for i in 0..3 {
            store
                .append_message(&stream, new_message("bob-uid", &format!("m{i}")))
                .await
                .unwrap();
        }
        store
            .create_profile_if_absent(&profile("bob-uid", "bob"))
            .await
            .unwrap();

        let (events, _rx) = crate::events::channel();
        let unread =
            UnreadAggregator::start(Arc::new(store.clone()), me, 50, events).unwrap();
        assert_eq!(unread.count_for(&bob), 3);
    }

    #[tokio::test]
    async fn marking_read_resets_the_badge_and_later_messages_count_again() {
        let store = MemoryChatStore::new();
        let me = UserId::new("me");
        let bob = UserId::new("bob-uid");
        let stream = StreamId::direct(&me, &bob);

        store
            .create_profile_if_absent(&profile("bob-uid", "bob"))
            .await
            .unwrap();

        let (events, _rx) = crate::events::channel();
        let unread =
            UnreadAggregator::start(Arc::new(store.clone()), me.clone(), 50, events).unwrap();

        store.append_message(&stream, new_message("bob-uid", "one")).await.unwrap();
        store.append_message(&stream, new_message("bob-uid", "two")).await.unwrap();
        assert_eq!(unread.count_for(&bob), 2);

        store.mark_read(&me, &stream).await.unwrap();
        assert_eq!(unread.count_for(&bob), 0);

        store.append_message(&stream, new_message("bob-uid", "three")).await.unwrap();
        assert_eq!(unread.count_for(&bob), 1);
    }

    #[tokio::test]
    async fn badges_stay_live_for_peers_other_than_the_active_one() {
        let store = MemoryChatStore::new();
        let me = UserId::new("me");
        let alice = UserId::new("alice-uid");
        let zoe = UserId::new("zoe-uid");

        store.create_profile_if_absent(&profile("alice-uid", "alice")).await.unwrap();
        store.create_profile_if_absent(&profile("zoe-uid", "zoe")).await.unwrap();

        let (events, _rx) = crate::events::channel();
        let unread =
            UnreadAggregator::start(Arc::new(store.clone()), me.clone(), 50, events).unwrap();

        // Messages arrive on both direct streams while neither is open.
        store
            .append_message(&StreamId::direct(&me, &alice), new_message("alice-uid", "hi"))
            .await
            .unwrap();
        store
            .append_message(&StreamId::direct(&me, &zoe), new_message("zoe-uid", "yo"))
            .await
            .unwrap();
        store
            .append_message(&StreamId::direct(&me, &zoe), new_message("zoe-uid", "there?"))
            .await
            .unwrap();

        assert_eq!(unread.count_for(&alice), 1);
        assert_eq!(unread.count_for(&zoe), 2);
    }

    #[tokio::test]
    async fn peers_registering_later_are_picked_up() {
        let store = MemoryChatStore::new();
        let me = UserId::new("me");
        let bob = UserId::new("bob-uid");
        let stream = StreamId::direct(&me, &bob);

        let (events, _rx) = crate::events::channel();
        let unread =
            UnreadAggregator::start(Arc::new(store.clone()), me, 50, events).unwrap();
        assert_eq!(unread.count_for(&bob), 0);

        store.create_profile_if_absent(&profile("bob-uid", "bob")).await.unwrap();
        store.append_message(&stream, new_message("bob-uid", "hello")).await.unwrap();
        assert_eq!(unread.count_for(&bob), 1);
    }
}
