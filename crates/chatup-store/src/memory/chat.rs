use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;
use uuid::Uuid;

use chatup_shared::{
    Message, NewMessage, Profile, ProfileError, ReadWatermark, SendError, StreamId,
    SubscriptionError, UserId,
};

use crate::document::{ChatStore, MessageListener, ProfileListener, WatermarkListener};
use crate::subscription::{ListenerId, ListenerSet, Subscription};

struct MessageEntry {
    stream: StreamId,
    limit: usize,
    listener: MessageListener,
}

struct WatermarkEntry {
    owner: UserId,
    listener: WatermarkListener,
}

/// In-memory stand-in for the hosted document store.
#[derive(Clone, Default)]
pub struct MemoryChatStore {
    inner: Arc<ChatInner>,
}

#[derive(Default)]
struct ChatInner {
    streams: Mutex<HashMap<StreamId, Vec<Message>>>,
    profiles: Mutex<HashMap<UserId, Profile>>,
    watermarks: Mutex<HashMap<(UserId, StreamId), DateTime<Utc>>>,
    /// Last assigned server timestamp, millis.
    clock: Mutex<i64>,
    message_listeners: Mutex<HashMap<ListenerId, MessageEntry>>,
    profile_listeners: ListenerSet<dyn Fn(&[Profile]) + Send + Sync>,
    watermark_listeners: Mutex<HashMap<ListenerId, WatermarkEntry>>,
    fail_appends: AtomicBool,
    fail_subscriptions: AtomicBool,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `append_message` calls fail, for send-failure paths.
    pub fn fail_appends(&self, fail: bool) {
        self.inner.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `subscribe_*` calls fail, for degraded-view paths.
    pub fn fail_subscriptions(&self, fail: bool) {
        self.inner.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    /// Next server timestamp: wall clock, bumped where needed to stay
    /// strictly monotonic across assignments.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_millis();
        let assigned = match self.inner.clock.lock() {
            Ok(mut last) => {
                let assigned = now.max(*last + 1);
                *last = assigned;
                assigned
            }
            Err(_) => now,
        };
        Utc.timestamp_millis_opt(assigned)
            .single()
            .unwrap_or_else(Utc::now)
    }

    fn window(messages: &[Message], limit: usize) -> Vec<Message> {
        let start = messages.len().saturating_sub(limit);
        messages[start..].to_vec()
    }

    fn subscriptions_refused(&self) -> bool {
        self.inner.fail_subscriptions.load(Ordering::SeqCst)
    }

    fn notify_stream(&self, stream: &StreamId) {
        // Snapshot the matching listeners so callbacks run outside the locks.
        let targets: Vec<(usize, MessageListener)> = match self.inner.message_listeners.lock() {
            Ok(map) => map
                .values()
                .filter(|entry| &entry.stream == stream)
                .map(|entry| (entry.limit, entry.listener.clone()))
                .collect(),
            Err(_) => return,
        };
        if targets.is_empty() {
            return;
        }

        let messages = match self.inner.streams.lock() {
            Ok(streams) => streams.get(stream).cloned().unwrap_or_default(),
            Err(_) => return,
        };
        for (limit, listener) in targets {
            listener(&Self::window(&messages, limit));
        }
    }

    fn roster(&self) -> Vec<Profile> {
        let mut roster: Vec<Profile> = match self.inner.profiles.lock() {
            Ok(profiles) => profiles.values().cloned().collect(),
            Err(_) => return Vec::new(),
        };
        roster.sort_by(|a, b| a.username.cmp(&b.username));
        roster
    }

    fn notify_profiles(&self) {
        let roster = self.roster();
        for listener in self.inner.profile_listeners.snapshot() {
            listener(&roster);
        }
    }

    fn notify_watermark(&self, owner: &UserId, mark: &ReadWatermark) {
        let targets: Vec<WatermarkListener> = match self.inner.watermark_listeners.lock() {
            Ok(map) => map
                .values()
                .filter(|entry| &entry.owner == owner)
                .map(|entry| entry.listener.clone())
                .collect(),
            Err(_) => return,
        };
        for listener in targets {
            listener(mark);
        }
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn append_message(
        &self,
        stream: &StreamId,
        new: NewMessage,
    ) -> Result<Message, SendError> {
        if self.inner.fail_appends.load(Ordering::SeqCst) {
            return Err(SendError::Rejected("write rejected by store".to_string()));
        }

        let text = new.text.trim();
        if text.is_empty() {
            return Err(SendError::Rejected("empty message text".to_string()));
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            sender_id: new.sender_id,
            sender_username: new.sender_username,
            sender_full_name: new.sender_full_name,
            sent_at: self.next_timestamp(),
        };

        {
            let mut streams = self
                .inner
                .streams
                .lock()
                .map_err(|_| SendError::Rejected("stream table poisoned".to_string()))?;
            streams.entry(stream.clone()).or_default().push(message.clone());
        }

        debug!(stream = %stream, id = %message.id, "message appended");
        self.notify_stream(stream);
        Ok(message)
    }

    fn subscribe_messages(
        &self,
        stream: &StreamId,
        limit: usize,
        listener: MessageListener,
    ) -> Result<Subscription, SubscriptionError> {
        if self.subscriptions_refused() {
            return Err(SubscriptionError::Establish(
                "live query refused".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        if let Ok(mut map) = self.inner.message_listeners.lock() {
            map.insert(
                id,
                MessageEntry {
                    stream: stream.clone(),
                    limit,
                    listener: listener.clone(),
                },
            );
        }

        // Initial delivery with the current window.
        let snapshot = match self.inner.streams.lock() {
            Ok(streams) => {
                Self::window(&streams.get(stream).cloned().unwrap_or_default(), limit)
            }
            Err(_) => Vec::new(),
        };
        listener(&snapshot);

        let inner = self.inner.clone();
        Ok(Subscription::new(id, move || {
            if let Ok(mut map) = inner.message_listeners.lock() {
                map.remove(&id);
            }
        }))
    }

    async fn create_profile_if_absent(&self, profile: &Profile) -> Result<(), ProfileError> {
        let created = {
            let mut profiles = self
                .inner
                .profiles
                .lock()
                .map_err(|_| ProfileError::Creation("profile table poisoned".to_string()))?;
            if profiles.contains_key(&profile.id) {
                false
            } else {
                profiles.insert(profile.id.clone(), profile.clone());
                true
            }
        };

        if created {
            debug!(user = %profile.id, username = %profile.username, "profile created");
            self.notify_profiles();
        }
        Ok(())
    }

    async fn profile(&self, id: &UserId) -> Result<Option<Profile>, ProfileError> {
        let profiles = self
            .inner
            .profiles
            .lock()
            .map_err(|_| ProfileError::Lookup("profile table poisoned".to_string()))?;
        Ok(profiles.get(id).cloned())
    }

    fn subscribe_profiles(
        &self,
        listener: ProfileListener,
    ) -> Result<Subscription, SubscriptionError> {
        if self.subscriptions_refused() {
            return Err(SubscriptionError::Establish(
                "live query refused".to_string(),
            ));
        }

        let id = self.inner.profile_listeners.insert(listener.clone());
        listener(&self.roster());

        let inner = self.inner.clone();
        Ok(Subscription::new(id, move || {
            inner.profile_listeners.remove(&id);
        }))
    }

    async fn mark_read(
        &self,
        owner: &UserId,
        stream: &StreamId,
    ) -> Result<ReadWatermark, SendError> {
        let at = self.next_timestamp();
        {
            let mut watermarks = self
                .inner
                .watermarks
                .lock()
                .map_err(|_| SendError::Rejected("watermark table poisoned".to_string()))?;
            // Merge semantics: only this stream's entry moves.
            watermarks.insert((owner.clone(), stream.clone()), at);
        }

        let mark = ReadWatermark {
            stream_id: stream.clone(),
            last_read_at: at,
        };
        debug!(owner = %owner, stream = %stream, "read watermark advanced");
        self.notify_watermark(owner, &mark);
        Ok(mark)
    }

    fn subscribe_watermarks(
        &self,
        owner: &UserId,
        listener: WatermarkListener,
    ) -> Result<Subscription, SubscriptionError> {
        if self.subscriptions_refused() {
            return Err(SubscriptionError::Establish(
                "live query refused".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        if let Ok(mut map) = self.inner.watermark_listeners.lock() {
            map.insert(
                id,
                WatermarkEntry {
                    owner: owner.clone(),
                    listener: listener.clone(),
                },
            );
        }

        // Replay the known watermarks for this owner.
        let known: Vec<ReadWatermark> = match self.inner.watermarks.lock() {
            Ok(watermarks) => watermarks
                .iter()
                .filter(|((o, _), _)| o == owner)
                .map(|((_, stream), at)| ReadWatermark {
                    stream_id: stream.clone(),
                    last_read_at: *at,
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        for mark in &known {
            listener(mark);
        }

        let inner = self.inner.clone();
        Ok(Subscription::new(id, move || {
            if let Ok(mut map) = inner.watermark_listeners.lock() {
                map.remove(&id);
            }
        }))
    }
}
