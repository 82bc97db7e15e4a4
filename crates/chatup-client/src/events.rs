//! Typed notifications delivered to the embedding UI layer.

use serde::Serialize;
use tokio::sync::mpsc;

use chatup_shared::{PresenceState, StreamId, UserId};

/// Sender half handed to every component.
pub type EventSink = mpsc::UnboundedSender<ClientEvent>;

/// Events the frontend consumes to refresh its views.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Auth state resolved or changed.
    AuthStateChanged { signed_in: bool },
    /// The roster changed; `count` excludes self.
    RosterUpdated { count: usize },
    /// One user's presence record changed.
    PresenceChanged { user_id: UserId, state: PresenceState },
    /// The active view's message sequence changed. The UI scrolls to the
    /// latest message on every delivery.
    MessagesUpdated { stream_id: StreamId, count: usize },
    /// A peer's unread badge changed.
    UnreadChanged { peer: UserId, count: usize },
    /// An outgoing message was rejected; the draft is preserved.
    SendFailed { reason: String },
}

/// Create the event channel shared by a client and its embedding shell.
pub fn channel() -> (EventSink, mpsc::UnboundedReceiver<ClientEvent>) {
    mpsc::unbounded_channel()
}

/// Emit without unwinding: a missing consumer only costs the event.
pub fn emit(sink: &EventSink, event: ClientEvent) {
    if sink.send(event).is_err() {
        tracing::debug!("client event dropped, no consumer attached");
    }
}
