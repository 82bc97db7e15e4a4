//! Domain model structs exchanged with the backing collaborators.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a frontend shell or persisted by a collaborator client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{StreamId, UserId};

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// An authenticated identity, as reported by the auth collaborator.
///
/// Created on successful authentication, immutable for the session
/// lifetime, cleared on logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    /// Opaque, stable id assigned by the auth collaborator.
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub username: Option<String>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The display profile of one registered principal.
///
/// Created once at registration (create-if-absent, never overwritten),
/// read-mostly afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    pub full_name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    Online,
    Offline,
}

/// The online/offline status blob for one user.
///
/// Written by the owning client on connect and by the store-fired
/// disconnect hook when that client's connection drops.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub state: PresenceState,
    pub last_changed_at_ms: i64,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message. Immutable once stored; never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Id assigned by the store.
    pub id: String,
    /// Non-empty, trimmed body.
    pub text: String,
    pub sender_id: UserId,
    pub sender_username: String,
    pub sender_full_name: String,
    /// Server-assigned send time.
    pub sent_at: DateTime<Utc>,
}

/// An outgoing message before the store has assigned id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewMessage {
    pub text: String,
    pub sender_id: UserId,
    pub sender_username: String,
    pub sender_full_name: String,
}

// ---------------------------------------------------------------------------
// Read watermark
// ---------------------------------------------------------------------------

/// "Read up to" marker for one peer stream, one per (self, peer) pair.
///
/// Moved to the store's current time whenever the owner opens that
/// conversation; a stream with no watermark reads as epoch zero, so a
/// never-opened conversation shows its full history as unread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadWatermark {
    pub stream_id: StreamId,
    pub last_read_at: DateTime<Utc>,
}
