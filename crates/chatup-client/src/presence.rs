//! Presence tracking over the realtime collaborator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use chatup_shared::{ChatError, PresenceRecord, PresenceState, UserId};
use chatup_store::{PresenceStore, Subscription};

use crate::events::{emit, ClientEvent, EventSink};

/// Live online/offline map for every user who has ever connected.
pub struct PresenceTracker {
    presence: Arc<dyn PresenceStore>,
    self_id: UserId,
    inner: Arc<Mutex<HashMap<UserId, PresenceRecord>>>,
    _sub: Subscription,
}

impl PresenceTracker {
    /// Subscribe to the presence subtree, announce self as online and arm
    /// the disconnect hook.
    pub async fn start(
        presence: Arc<dyn PresenceStore>,
        self_id: UserId,
        events: EventSink,
    ) -> Result<Self, ChatError> {
        let inner: Arc<Mutex<HashMap<UserId, PresenceRecord>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let listener_inner = inner.clone();
        let sub = presence.subscribe(Arc::new(move |record: &PresenceRecord| {
            if let Ok(mut map) = listener_inner.lock() {
                map.insert(record.user_id.clone(), record.clone());
            }
            emit(
                &events,
                ClientEvent::PresenceChanged {
                    user_id: record.user_id.clone(),
                    state: record.state,
                },
            );
        }))?;

        presence.set_state(&self_id, PresenceState::Online).await?;
        // The hook covers crash, network loss and tab close; explicit
        // logout writes offline itself, without waiting for detection.
        presence.set_offline_on_disconnect(&self_id).await?;

        info!(user = %self_id, "presence online, disconnect hook armed");
        Ok(Self {
            presence,
            self_id,
            inner,
            _sub: sub,
        })
    }

    pub fn state_of(&self, user: &UserId) -> PresenceState {
        self.inner
            .lock()
            .ok()
            .and_then(|map| map.get(user).map(|record| record.state))
            .unwrap_or(PresenceState::Offline)
    }

    pub fn is_online(&self, user: &UserId) -> bool {
        self.state_of(user) == PresenceState::Online
    }

    pub fn snapshot(&self) -> HashMap<UserId, PresenceRecord> {
        self.inner.lock().map(|map| map.clone()).unwrap_or_default()
    }

    /// Voluntary-path teardown: write offline now instead of waiting for
    /// disconnect detection, then let the caller sign out.
    pub async fn go_offline(&self) {
        if let Err(e) = self
            .presence
            .set_state(&self.self_id, PresenceState::Offline)
            .await
        {
            warn!(user = %self.self_id, error = %e, "explicit offline write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatup_store::MemoryPresence;

    #[tokio::test]
    async fn start_marks_self_online_and_arms_the_hook() {
        let presence = MemoryPresence::new();
        let (events, _rx) = crate::events::channel();
        let self_id = UserId::new("u1");

        let tracker =
            PresenceTracker::start(Arc::new(presence.clone()), self_id.clone(), events)
                .await
                .unwrap();
        assert!(tracker.is_online(&self_id));

        // Involuntary disconnect: the store fires the hook, no client action.
        presence.drop_connection(&self_id);
        assert_eq!(tracker.state_of(&self_id), PresenceState::Offline);
    }

    #[tokio::test]
    async fn other_clients_appear_in_the_live_map() {
        let presence = MemoryPresence::new();
        let (events, _rx) = crate::events::channel();
        let peer = UserId::new("u2");

        let tracker =
            PresenceTracker::start(Arc::new(presence.clone()), UserId::new("u1"), events)
                .await
                .unwrap();
        assert_eq!(tracker.state_of(&peer), PresenceState::Offline);

        presence.set_state(&peer, PresenceState::Online).await.unwrap();
        assert!(tracker.is_online(&peer));
        assert_eq!(tracker.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn go_offline_writes_before_teardown() {
        let presence = MemoryPresence::new();
        let (events, _rx) = crate::events::channel();
        let self_id = UserId::new("u1");

        let tracker =
            PresenceTracker::start(Arc::new(presence.clone()), self_id.clone(), events)
                .await
                .unwrap();
        tracker.go_offline().await;

        assert_eq!(
            presence.record(&self_id).map(|r| r.state),
            Some(PresenceState::Offline),
        );
    }
}
