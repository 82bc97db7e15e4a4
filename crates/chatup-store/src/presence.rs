//! The realtime presence-store seam.
//!
//! Records live under `status/{user_id}` in the hosted collaborator. Each
//! record is single-writer by construction: the owning client writes it on
//! connect and at logout, and the store-side disconnect hook writes it when
//! that client's connection drops. The hook is the only reliable signal for
//! involuntary disconnection; explicit writes just cover the voluntary path
//! faster.

use std::sync::Arc;

use async_trait::async_trait;

use chatup_shared::{PresenceRecord, PresenceState, SendError, SubscriptionError, UserId};

use crate::subscription::Subscription;

/// Callback receiving one changed presence record.
pub type PresenceListener = Arc<dyn Fn(&PresenceRecord) + Send + Sync>;

/// Operations of the external realtime key-value store.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Point write of `user`'s presence record, stamped with the store's
    /// current time.
    async fn set_state(&self, user: &UserId, state: PresenceState) -> Result<(), SendError>;

    /// Arm the store-side disconnect hook: when this client's connection is
    /// lost the store itself writes an `Offline` record for `user`. Covers
    /// crash, network loss and tab close alike, independent of explicit
    /// logout.
    async fn set_offline_on_disconnect(&self, user: &UserId) -> Result<(), SendError>;

    /// Register for presence changes. Replays every known record before
    /// returning, then fires per change.
    fn subscribe(&self, listener: PresenceListener) -> Result<Subscription, SubscriptionError>;
}
