//! Live message window for the active conversation.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::warn;

use chatup_shared::constants::SYSTEM_SENDER;
use chatup_shared::{Message, StreamId, UserId};
use chatup_store::{ChatStore, Subscription};

use crate::events::{emit, ClientEvent, EventSink};

/// Ascending, bounded window over the active stream's most recent
/// messages.
pub struct MessageView {
    store: Arc<dyn ChatStore>,
    window: usize,
    events: EventSink,
    inner: Arc<Mutex<ViewInner>>,
}

#[derive(Default)]
struct ViewInner {
    stream: Option<StreamId>,
    messages: Vec<Message>,
    sub: Option<Subscription>,
}

impl MessageView {
    pub fn new(store: Arc<dyn ChatStore>, window: usize, events: EventSink) -> Self {
        Self {
            store,
            window,
            events,
            inner: Arc::new(Mutex::new(ViewInner::default())),
        }
    }

    /// Drop the displayed messages and the live handle. Runs before every
    /// target hand-off so the previous conversation never flashes through.
    pub fn clear(&self) {
        if let Ok(mut state) = self.inner.lock() {
            state.sub = None;
            state.stream = None;
            state.messages.clear();
        }
    }

    /// Point the view at `stream`, tearing down the previous subscription
    /// first. A failed subscription yields a single synthetic system
    /// message instead of a silently empty view.
    pub fn subscribe(&self, stream: StreamId) {
        {
            let Ok(mut state) = self.inner.lock() else {
                return;
            };
            state.sub = None;
            state.stream = Some(stream.clone());
            state.messages.clear();
        }

        let listener_inner = self.inner.clone();
        let listener_events = self.events.clone();
        let listener_stream = stream.clone();
        let result = self.store.subscribe_messages(
            &stream,
            self.window,
            Arc::new(move |messages: &[Message]| {
                let count = messages.len();
                {
                    let Ok(mut state) = listener_inner.lock() else {
                        return;
                    };
                    // Deliveries for a stream that is no longer current are
                    // dropped.
                    if state.stream.as_ref() != Some(&listener_stream) {
                        return;
                    }
                    state.messages = messages.to_vec();
                }
                emit(
                    &listener_events,
                    ClientEvent::MessagesUpdated {
                        stream_id: listener_stream.clone(),
                        count,
                    },
                );
            }),
        );

        match result {
            Ok(sub) => {
                if let Ok(mut state) = self.inner.lock() {
                    if state.stream.as_ref() == Some(&stream) {
                        state.sub = Some(sub);
                    }
                }
            }
            Err(e) => {
                warn!(stream = %stream, error = %e, "message subscription failed");
                if let Ok(mut state) = self.inner.lock() {
                    state.messages = vec![load_failure_notice()];
                }
                emit(
                    &self.events,
                    ClientEvent::MessagesUpdated {
                        stream_id: stream,
                        count: 1,
                    },
                );
            }
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .lock()
            .map(|state| state.messages.clone())
            .unwrap_or_default()
    }

    pub fn stream(&self) -> Option<StreamId> {
        self.inner.lock().ok().and_then(|state| state.stream.clone())
    }
}

/// The inline notice shown when the live query cannot be established.
fn load_failure_notice() -> Message {
    Message {
        id: "error".to_string(),
        text: "Failed to load messages. Please refresh.".to_string(),
        sender_id: UserId::new(SYSTEM_SENDER),
        sender_username: SYSTEM_SENDER.to_string(),
        sender_full_name: SYSTEM_SENDER.to_string(),
        sent_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatup_shared::NewMessage;
    use chatup_store::MemoryChatStore;

    fn new_message(sender: &str, text: &str) -> NewMessage {
        NewMessage {
            text: text.to_string(),
            sender_id: UserId::new(sender),
            sender_username: sender.to_string(),
            sender_full_name: sender.to_string(),
        }
    }

    #[tokio::test]
    async fn shows_the_current_window_and_live_appends() {
        let store = MemoryChatStore::new();
        let stream = StreamId::public();
        store.append_message(&stream, new_message("u1", "first")).await.unwrap();

        let (events, _rx) = crate::events::channel();
        let view = MessageView::new(Arc::new(store.clone()), 50, events);
        view.subscribe(stream.clone());
        assert_eq!(view.messages().len(), 1);

        store.append_message(&stream, new_message("u2", "second")).await.unwrap();
        let messages = view.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "second");
    }

    #[tokio::test]
    async fn switching_streams_drops_the_old_feed() {
        let store = MemoryChatStore::new();
        let public = StreamId::public();
        let direct = StreamId::direct(&UserId::new("u1"), &UserId::new("u2"));
        store.append_message(&public, new_message("u1", "public talk")).await.unwrap();

        let (events, _rx) = crate::events::channel();
        let view = MessageView::new(Arc::new(store.clone()), 50, events);
        view.subscribe(public.clone());
        view.subscribe(direct.clone());
        assert!(view.messages().is_empty());

        // Appends to the abandoned stream must not reach the view.
        store.append_message(&public, new_message("u1", "more public")).await.unwrap();
        assert!(view.messages().is_empty());

        store.append_message(&direct, new_message("u2", "private")).await.unwrap();
        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].text, "private");
    }

    #[tokio::test]
    async fn failed_subscription_yields_a_system_notice() {
        let store = MemoryChatStore::new();
        store.fail_subscriptions(true);

        let (events, _rx) = crate::events::channel();
        let view = MessageView::new(Arc::new(store.clone()), 50, events);
        view.subscribe(StreamId::public());

        let messages = view.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender_id, UserId::new("system"));
        assert_eq!(messages[0].text, "Failed to load messages. Please refresh.");
    }

    #[tokio::test]
    async fn clear_empties_the_view() {
        let store = MemoryChatStore::new();
        let stream = StreamId::public();
        store.append_message(&stream, new_message("u1", "hello")).await.unwrap();

        let (events, _rx) = crate::events::channel();
        let view = MessageView::new(Arc::new(store.clone()), 50, events);
        view.subscribe(stream.clone());
        assert_eq!(view.messages().len(), 1);

        view.clear();
        assert!(view.messages().is_empty());
        assert_eq!(view.stream(), None);
    }
}
