//! # chatup-client
//!
//! The Chatup client core: the presence, unread-tracking and
//! message-routing logic behind the chat UI. Every component takes its
//! collaborator handles ([`chatup_store`] traits) at construction, holds at
//! most one live subscription per logical feed, and reports to the
//! embedding shell through [`events::ClientEvent`]s.

pub mod bot;
pub mod client;
pub mod composer;
pub mod directory;
pub mod events;
pub mod presence;
pub mod router;
pub mod session;
pub mod stream;
pub mod unread;

pub use client::{ChatClient, ChatRoom};
pub use events::{ClientEvent, EventSink};
pub use session::{ProfileFields, Session};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber for an embedding shell.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chatup_client=debug,chatup_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
