//! # chatup-store
//!
//! The collaborator seam of the Chatup client: traits for the hosted auth
//! service, document store and realtime presence store, cancel-on-drop
//! subscription handles, and in-memory reference backends.
//!
//! Components receive these handles at construction (no global singletons),
//! so tests and local development run against [`memory`] while production
//! shells inject clients for the hosted services.

pub mod auth;
pub mod document;
pub mod memory;
pub mod presence;
pub mod subscription;

pub use auth::{AuthClient, AuthListener};
pub use document::{ChatStore, MessageListener, ProfileListener, WatermarkListener};
pub use memory::{MemoryAuth, MemoryChatStore, MemoryPresence};
pub use presence::{PresenceListener, PresenceStore};
pub use subscription::{ListenerId, Subscription};
