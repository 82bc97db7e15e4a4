//! Outgoing-message input state.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use chatup_shared::NewMessage;
use chatup_store::ChatStore;

use crate::directory::ProfileDirectory;
use crate::events::{emit, ClientEvent, EventSink};
use crate::router::ConversationRouter;

/// Owns the draft text and dispatches it to the active target's stream.
pub struct Composer {
    store: Arc<dyn ChatStore>,
    directory: Arc<ProfileDirectory>,
    router: Arc<ConversationRouter>,
    state: Arc<Mutex<ComposerState>>,
    events: EventSink,
}

#[derive(Default)]
struct ComposerState {
    draft: String,
    in_flight: bool,
}

impl Composer {
    pub fn new(
        store: Arc<dyn ChatStore>,
        directory: Arc<ProfileDirectory>,
        router: Arc<ConversationRouter>,
        events: EventSink,
    ) -> Self {
        Self {
            store,
            directory,
            router,
            state: Arc::new(Mutex::new(ComposerState::default())),
            events,
        }
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.draft = text.into();
        }
    }

    pub fn draft(&self) -> String {
        self.state
            .lock()
            .map(|state| state.draft.clone())
            .unwrap_or_default()
    }

    /// `true` while a send is in flight; input and the send affordance stay
    /// disabled for the duration.
    pub fn is_sending(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.in_flight)
            .unwrap_or(false)
    }

    /// Dispatch the current draft to the active target.
    ///
    /// A blank draft, an in-flight send, or an unresolved own profile make
    /// this a silent no-op: no store write is issued. The in-flight flag is
    /// what keeps repeated activation (rapid Enter presses) from
    /// duplicating a message. On failure the draft survives for a retry;
    /// on success it is cleared.
    pub async fn send(&self) {
        let text = {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            let text = state.draft.trim().to_string();
            if text.is_empty() || state.in_flight {
                return;
            }
            state.in_flight = true;
            text
        };

        // Sender fields come from the profile as resolved now, not from
        // values cached when typing began.
        let Some(profile) = self.directory.own_profile() else {
            if let Ok(mut state) = self.state.lock() {
                state.in_flight = false;
            }
            return;
        };

        let stream = self.router.current_stream_id();
        let outgoing = NewMessage {
            text,
            sender_id: profile.id,
            sender_username: profile.username,
            sender_full_name: profile.full_name,
        };

        match self.store.append_message(&stream, outgoing).await {
            Ok(message) => {
                debug!(stream = %stream, id = %message.id, "message sent");
                if let Ok(mut state) = self.state.lock() {
                    state.draft.clear();
                    state.in_flight = false;
                }
            }
            Err(e) => {
                warn!(stream = %stream, error = %e, "send failed");
                if let Ok(mut state) = self.state.lock() {
                    // Draft stays; the user retries.
                    state.in_flight = false;
                }
                emit(
                    &self.events,
                    ClientEvent::SendFailed {
                        reason: e.to_string(),
                    },
                );
            }
        }
    }
}
