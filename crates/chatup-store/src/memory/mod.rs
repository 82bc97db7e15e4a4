//! In-memory reference backends.
//!
//! Single-process implementations of the collaborator traits with the same
//! observable contract as the hosted services: synchronous listener
//! delivery (always outside the backend's own locks), strictly monotonic
//! server timestamps, replay-on-subscribe. They power the test suite and
//! local development; production shells inject hosted-service clients
//! instead.
//!
//! One [`MemoryAuth`] models one client's auth connection. To simulate
//! several concurrent clients, give each its own `MemoryAuth` and share a
//! single [`MemoryChatStore`] and [`MemoryPresence`] between them.

mod auth;
mod chat;
mod presence;

pub use auth::MemoryAuth;
pub use chat::MemoryChatStore;
pub use presence::MemoryPresence;

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
