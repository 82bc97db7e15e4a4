//! The document-store seam.
//!
//! The hosted store's hierarchical collections
//! (`artifacts/{app}/public/data/{users,messages,lastRead}`) are reduced to
//! the typed operations the client core actually issues: ordered live
//! windows over message streams, the profile roster, and per-user read
//! watermarks with merge-upsert semantics.

use std::sync::Arc;

use async_trait::async_trait;

use chatup_shared::{
    Message, NewMessage, Profile, ProfileError, ReadWatermark, SendError, StreamId,
    SubscriptionError, UserId,
};

use crate::subscription::Subscription;

/// Callback receiving the full current window of one stream, ascending by
/// send time.
pub type MessageListener = Arc<dyn Fn(&[Message]) + Send + Sync>;

/// Callback receiving the full roster, ordered by username.
pub type ProfileListener = Arc<dyn Fn(&[Profile]) + Send + Sync>;

/// Callback receiving one upserted read watermark.
pub type WatermarkListener = Arc<dyn Fn(&ReadWatermark) + Send + Sync>;

/// Operations of the external document store.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Append `new` to `stream`. The store assigns the message id and a
    /// server timestamp that is strictly monotonic within the store.
    async fn append_message(
        &self,
        stream: &StreamId,
        new: NewMessage,
    ) -> Result<Message, SendError>;

    /// Live ascending window over the most recent `limit` messages of
    /// `stream`. Fires once with the current window before returning, then
    /// after every append.
    fn subscribe_messages(
        &self,
        stream: &StreamId,
        limit: usize,
        listener: MessageListener,
    ) -> Result<Subscription, SubscriptionError>;

    /// Create the profile document unless one already exists. Never
    /// overwrites.
    async fn create_profile_if_absent(&self, profile: &Profile) -> Result<(), ProfileError>;

    /// Point read of one profile.
    async fn profile(&self, id: &UserId) -> Result<Option<Profile>, ProfileError>;

    /// Live roster of every profile, ordered by username. Fires once with
    /// the current roster before returning, then on every addition.
    fn subscribe_profiles(
        &self,
        listener: ProfileListener,
    ) -> Result<Subscription, SubscriptionError>;

    /// Merge-upsert the read watermark of `stream` for `owner` to the
    /// store's current time. Unrelated fields of the record are untouched.
    /// Returns the watermark actually written.
    async fn mark_read(
        &self,
        owner: &UserId,
        stream: &StreamId,
    ) -> Result<ReadWatermark, SendError>;

    /// Live view of `owner`'s read watermarks. Replays the known records
    /// before returning, then fires on every upsert.
    fn subscribe_watermarks(
        &self,
        owner: &UserId,
        listener: WatermarkListener,
    ) -> Result<Subscription, SubscriptionError>;
}
