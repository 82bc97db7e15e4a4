use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use chatup_shared::constants::PRESENCE_PATH;
use chatup_shared::{PresenceRecord, PresenceState, SendError, SubscriptionError, UserId};

use crate::memory::now_ms;
use crate::presence::{PresenceListener, PresenceStore};
use crate::subscription::{ListenerSet, Subscription};

/// In-memory stand-in for the hosted realtime key-value store.
#[derive(Clone, Default)]
pub struct MemoryPresence {
    inner: Arc<PresenceInner>,
}

#[derive(Default)]
struct PresenceInner {
    records: Mutex<HashMap<UserId, PresenceRecord>>,
    /// Users whose disconnect hook has been armed.
    armed: Mutex<HashSet<UserId>>,
    listeners: ListenerSet<dyn Fn(&PresenceRecord) + Send + Sync>,
}

impl MemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, user: &UserId, state: PresenceState) {
        let record = PresenceRecord {
            user_id: user.clone(),
            state,
            last_changed_at_ms: now_ms(),
        };
        debug!(path = %format!("{PRESENCE_PATH}/{user}"), state = ?state, "presence write");
        if let Ok(mut records) = self.inner.records.lock() {
            records.insert(user.clone(), record.clone());
        }
        for listener in self.inner.listeners.snapshot() {
            listener(&record);
        }
    }

    /// Simulate the loss of `user`'s connection. If the disconnect hook is
    /// armed, the store writes the `Offline` record itself, exactly as the
    /// hosted collaborator does server-side.
    pub fn drop_connection(&self, user: &UserId) {
        let armed = self
            .inner
            .armed
            .lock()
            .map(|set| set.contains(user))
            .unwrap_or(false);
        if armed {
            debug!(user = %user, "disconnect hook fired");
            self.write(user, PresenceState::Offline);
        }
    }

    /// Current record for one user, if any.
    pub fn record(&self, user: &UserId) -> Option<PresenceRecord> {
        self.inner
            .records
            .lock()
            .ok()
            .and_then(|records| records.get(user).cloned())
    }
}

#[async_trait]
impl PresenceStore for MemoryPresence {
    async fn set_state(&self, user: &UserId, state: PresenceState) -> Result<(), SendError> {
        self.write(user, state);
        Ok(())
    }

    async fn set_offline_on_disconnect(&self, user: &UserId) -> Result<(), SendError> {
        if let Ok(mut armed) = self.inner.armed.lock() {
            armed.insert(user.clone());
        }
        debug!(user = %user, "disconnect hook armed");
        Ok(())
    }

    fn subscribe(&self, listener: PresenceListener) -> Result<Subscription, SubscriptionError> {
        let id = self.inner.listeners.insert(listener.clone());

        // Replay every known record.
        let known: Vec<PresenceRecord> = match self.inner.records.lock() {
            Ok(records) => records.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        for record in &known {
            listener(record);
        }

        let inner = self.inner.clone();
        Ok(Subscription::new(id, move || {
            inner.listeners.remove(&id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn armed_hook_fires_on_connection_drop() {
        let presence = MemoryPresence::new();
        let user = UserId::new("u1");

        presence.set_state(&user, PresenceState::Online).await.unwrap();
        presence.set_offline_on_disconnect(&user).await.unwrap();

        presence.drop_connection(&user);
        assert_eq!(
            presence.record(&user).map(|r| r.state),
            Some(PresenceState::Offline),
        );
    }

    #[tokio::test]
    async fn unarmed_drop_is_a_no_op() {
        let presence = MemoryPresence::new();
        let user = UserId::new("u1");

        presence.set_state(&user, PresenceState::Online).await.unwrap();
        presence.drop_connection(&user);

        assert_eq!(
            presence.record(&user).map(|r| r.state),
            Some(PresenceState::Online),
        );
    }

    #[tokio::test]
    async fn subscribe_replays_known_records_then_streams_changes() {
        let presence = MemoryPresence::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        presence
            .set_state(&alice, PresenceState::Online)
            .await
            .unwrap();

        let seen: Arc<Mutex<Vec<(UserId, PresenceState)>>> = Arc::new(Mutex::new(Vec::new()));
        let listener_seen = seen.clone();
        let _sub = presence
            .subscribe(Arc::new(move |record| {
                listener_seen
                    .lock()
                    .unwrap()
                    .push((record.user_id.clone(), record.state));
            }))
            .unwrap();

        presence.set_state(&bob, PresenceState::Online).await.unwrap();
        presence
            .set_state(&alice, PresenceState::Offline)
            .await
            .unwrap();

        let deliveries = seen.lock().unwrap().clone();
        assert_eq!(deliveries.len(), 3);
        assert_eq!(deliveries[0], (alice.clone(), PresenceState::Online));
        assert_eq!(deliveries[2], (alice, PresenceState::Offline));
    }
}
