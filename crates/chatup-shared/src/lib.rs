//! # chatup-shared
//!
//! Types shared by every Chatup crate: identifier newtypes, the domain
//! models exchanged with the backing collaborators, the error taxonomy
//! and application configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use error::{AuthError, ChatError, ProfileError, SendError, SubscriptionError};
pub use models::*;
pub use types::{ConversationTarget, StreamId, UserId};
