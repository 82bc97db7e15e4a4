//! Conversation target selection.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use chatup_shared::{ConversationTarget, Profile, StreamId, UserId};
use chatup_store::ChatStore;

use crate::events::EventSink;
use crate::stream::MessageView;

/// Selects the active conversation and drives the message view.
pub struct ConversationRouter {
    store: Arc<dyn ChatStore>,
    self_id: UserId,
    target: Mutex<ConversationTarget>,
    view: MessageView,
}

impl ConversationRouter {
    pub fn new(
        store: Arc<dyn ChatStore>,
        self_id: UserId,
        window: usize,
        events: EventSink,
    ) -> Self {
        let view = MessageView::new(store.clone(), window, events);
        Self {
            store,
            self_id,
            target: Mutex::new(ConversationTarget::Public),
            view,
        }
    }

    /// Show the public room.
    pub fn select_public(&self) {
        self.switch(ConversationTarget::Public);
    }

    /// Open the 1:1 conversation with `peer` and mark it read.
    pub async fn select_direct(&self, peer: &Profile) {
        let stream = self.switch(ConversationTarget::Direct(peer.id.clone()));

        // Opening a conversation is what moves the read watermark. The
        // write is asynchronous; the badge catches up on the next
        // recompute.
        if let Err(e) = self.store.mark_read(&self.self_id, &stream).await {
            warn!(stream = %stream, error = %e, "failed to persist read watermark");
        }
    }

    fn switch(&self, target: ConversationTarget) -> StreamId {
        let stream = target.stream_id(&self.self_id);
        debug!(stream = %stream, "switching conversation target");

        // Stale messages must not survive the subscription hand-off.
        self.view.clear();
        if let Ok(mut current) = self.target.lock() {
            *current = target;
        }
        self.view.subscribe(stream.clone());
        stream
    }

    pub fn target(&self) -> ConversationTarget {
        self.target
            .lock()
            .map(|target| target.clone())
            .unwrap_or(ConversationTarget::Public)
    }

    /// Canonical stream id of any target, independent of the current one.
    pub fn stream_id_for(&self, target: &ConversationTarget) -> StreamId {
        target.stream_id(&self.self_id)
    }

    pub fn current_stream_id(&self) -> StreamId {
        self.target().stream_id(&self.self_id)
    }

    pub fn view(&self) -> &MessageView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatup_shared::NewMessage;
    use chatup_store::MemoryChatStore;

    fn profile(id: &str, username: &str) -> Profile {
        Profile {
            id: UserId::new(id),
            username: username.to_string(),
            full_name: username.to_string(),
            email: format!("{username}@example.com"),
        }
    }

    fn new_message(sender: &str, text: &str) -> NewMessage {
        NewMessage {
            text: text.to_string(),
            sender_id: UserId::new(sender),
            sender_username: sender.to_string(),
            sender_full_name: sender.to_string(),
        }
    }

    #[tokio::test]
    async fn selecting_a_target_shows_only_that_stream() {
        let store = MemoryChatStore::new();
        let (events, _rx) = crate::events::channel();
        let router = ConversationRouter::new(
            Arc::new(store.clone()),
            UserId::new("me"),
            50,
            events,
        );

        router.select_public();
        store
            .append_message(&StreamId::public(), new_message("other", "in public"))
            .await
            .unwrap();
        assert_eq!(router.view().messages().len(), 1);

        let bob = profile("bob-uid", "bob");
        router.select_direct(&bob).await;
        assert_eq!(router.target(), ConversationTarget::Direct(bob.id.clone()));
        assert!(router.view().messages().is_empty());

        router.select_public();
        assert_eq!(router.view().messages().len(), 1);
        assert_eq!(router.view().messages()[0].text, "in public");
    }

    #[tokio::test]
    async fn stream_ids_follow_the_canonical_rule() {
        let store = MemoryChatStore::new();
        let (events, _rx) = crate::events::channel();
        let router =
            ConversationRouter::new(Arc::new(store), UserId::new("zed"), 50, events);

        let amy = UserId::new("amy");
        assert_eq!(
            router.stream_id_for(&ConversationTarget::Direct(amy.clone())),
            StreamId::direct(&amy, &UserId::new("zed")),
        );
        assert_eq!(
            router.stream_id_for(&ConversationTarget::Public),
            StreamId::public(),
        );
    }

    #[tokio::test]
    async fn opening_a_direct_conversation_marks_it_read() {
        let store = MemoryChatStore::new();
        let me = UserId::new("me");
        let bob = profile("bob-uid", "bob");
        let stream = StreamId::direct(&me, &bob.id);

        store.append_message(&stream, new_message("bob-uid", "hi")).await.unwrap();

        let (events, _rx) = crate::events::channel();
        let router =
            ConversationRouter::new(Arc::new(store.clone()), me.clone(), 50, events);

        let seen: Arc<Mutex<Vec<StreamId>>> = Arc::new(Mutex::new(Vec::new()));
        let listener_seen = seen.clone();
        let _sub = store
            .subscribe_watermarks(
                &me,
                Arc::new(move |mark| {
                    listener_seen.lock().unwrap().push(mark.stream_id.clone());
                }),
            )
            .unwrap();

        router.select_direct(&bob).await;
        assert_eq!(*seen.lock().unwrap(), vec![stream]);
    }
}
