use serde::{Deserialize, Serialize};

use crate::constants::{DIRECT_STREAM_SEPARATOR, PUBLIC_STREAM};

// User identity = opaque id assigned by the auth collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StreamId(String);

impl StreamId {
    /// The singleton public room.
    pub fn public() -> Self {
        Self(PUBLIC_STREAM.to_string())
    }

    /// Canonical id of a 1:1 stream.
    ///
    /// The two participant ids are sorted lexicographically before being
    /// joined, so both sides derive the identical id without coordination:
    /// `direct(a, b) == direct(b, a)`.
    pub fn direct(a: &UserId, b: &UserId) -> Self {
        let (lo, hi) = if a.as_str() <= b.as_str() {
            (a, b)
        } else {
            (b, a)
        };
        Self(format!(
            "{}{}{}",
            lo.as_str(),
            DIRECT_STREAM_SEPARATOR,
            hi.as_str()
        ))
    }

    pub fn is_public(&self) -> bool {
        self.0 == PUBLIC_STREAM
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The conversation currently displayed: the public room or one peer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConversationTarget {
    Public,
    Direct(UserId),
}

impl ConversationTarget {
    /// The stream this target reads from and writes to, as seen by `own`.
    pub fn stream_id(&self, own: &UserId) -> StreamId {
        match self {
            Self::Public => StreamId::public(),
            Self::Direct(peer) => StreamId::direct(own, peer),
        }
    }

    pub fn peer(&self) -> Option<&UserId> {
        match self {
            Self::Public => None,
            Self::Direct(peer) => Some(peer),
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Direct(_))
    }
}
