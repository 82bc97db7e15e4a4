//! Root assembly: collaborator handles in, a signed-in chat room out.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use chatup_shared::{AppConfig, AuthError, ChatError, Principal};
use chatup_store::{AuthClient, ChatStore, PresenceStore};

use crate::composer::Composer;
use crate::directory::ProfileDirectory;
use crate::events::{self, ClientEvent, EventSink};
use crate::presence::PresenceTracker;
use crate::router::ConversationRouter;
use crate::session::{ProfileFields, Session};
use crate::unread::UnreadAggregator;

/// Wires the collaborator handles into the client core.
pub struct ChatClient {
    config: AppConfig,
    store: Arc<dyn ChatStore>,
    presence: Arc<dyn PresenceStore>,
    events: EventSink,
    session: Session,
}

impl ChatClient {
    /// Construct the client. Returns the receiver the embedding UI drains
    /// for [`ClientEvent`]s.
    pub fn new(
        config: AppConfig,
        auth: Arc<dyn AuthClient>,
        store: Arc<dyn ChatStore>,
        presence: Arc<dyn PresenceStore>,
    ) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (events, events_rx) = events::channel();
        let session = Session::new(auth, store.clone(), events.clone());

        info!(app = %config.app_id, "chat client constructed");
        (
            Self {
                config,
                store,
                presence,
                events,
                session,
            },
            events_rx,
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sign in and open the chat workspace.
    pub async fn login(&self, email: &str, password: &str) -> Result<ChatRoom, ChatError> {
        let principal = self.session.login(email, password).await?;
        self.open_room(principal).await
    }

    /// Register, sign in and open the chat workspace.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        fields: ProfileFields,
    ) -> Result<ChatRoom, ChatError> {
        let principal = self.session.register(email, password, fields).await?;
        self.open_room(principal).await
    }

    /// Voluntary logout: explicit offline write, then sign-out, then drop
    /// of every live subscription the room holds.
    pub async fn logout(&self, room: ChatRoom) -> Result<(), AuthError> {
        room.presence.go_offline().await;
        let result = self.session.logout().await;
        drop(room);
        result
    }

    /// Build the signed-in workspace: roster, presence, unread badges and
    /// the public room selected as the initial target.
    async fn open_room(&self, principal: Principal) -> Result<ChatRoom, ChatError> {
        let window = self.config.message_window;

        let directory = Arc::new(ProfileDirectory::new(
            self.store.clone(),
            principal.id.clone(),
            self.events.clone(),
        )?);
        let presence = PresenceTracker::start(
            self.presence.clone(),
            principal.id.clone(),
            self.events.clone(),
        )
        .await?;
        let unread = UnreadAggregator::start(
            self.store.clone(),
            principal.id.clone(),
            window,
            self.events.clone(),
        )?;
        let router = Arc::new(ConversationRouter::new(
            self.store.clone(),
            principal.id.clone(),
            window,
            self.events.clone(),
        ));
        router.select_public();
        let composer = Composer::new(
            self.store.clone(),
            directory.clone(),
            router.clone(),
            self.events.clone(),
        );

        info!(user = %principal.id, "chat room opened");
        Ok(ChatRoom {
            principal,
            directory,
            presence,
            router,
            unread,
            composer,
        })
    }
}

/// The signed-in chat workspace. Dropping it tears down every live
/// subscription it holds.
pub struct ChatRoom {
    principal: Principal,
    directory: Arc<ProfileDirectory>,
    presence: PresenceTracker,
    router: Arc<ConversationRouter>,
    unread: UnreadAggregator,
    composer: Composer,
}

impl ChatRoom {
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn directory(&self) -> &ProfileDirectory {
        &self.directory
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn router(&self) -> &ConversationRouter {
        &self.router
    }

    pub fn unread(&self) -> &UnreadAggregator {
        &self.unread
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatup_shared::PresenceState;
    use chatup_store::{MemoryAuth, MemoryChatStore, MemoryPresence};

    struct Backend {
        store: MemoryChatStore,
        presence: MemoryPresence,
    }

    impl Backend {
        fn new() -> Self {
            Self {
                store: MemoryChatStore::new(),
                presence: MemoryPresence::new(),
            }
        }

        /// One client per simulated browser: its own auth connection, the
        /// chat and presence stores shared.
        fn client(&self) -> (ChatClient, mpsc::UnboundedReceiver<ClientEvent>) {
            ChatClient::new(
                AppConfig::default(),
                Arc::new(MemoryAuth::new()),
                Arc::new(self.store.clone()),
                Arc::new(self.presence.clone()),
            )
        }
    }

    fn fields(username: &str) -> ProfileFields {
        ProfileFields {
            username: username.to_string(),
            full_name: format!("{username} Example"),
        }
    }

    #[tokio::test]
    async fn a_public_message_reaches_late_subscribers_with_the_sender_name() {
        let backend = Backend::new();
        let (alice_client, _alice_rx) = backend.client();
        let alice_room = alice_client
            .register("alice@example.com", "secret1", fields("alice"))
            .await
            .unwrap();

        alice_room.composer().set_draft("hi");
        alice_room.composer().send().await;
        assert_eq!(alice_room.router().view().messages().len(), 1);

        // A client opened seconds later still sees "hi" in its window.
        let (bob_client, _bob_rx) = backend.client();
        let bob_room = bob_client
            .register("bob@example.com", "secret1", fields("bob"))
            .await
            .unwrap();

        let messages = bob_room.router().view().messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hi");
        assert_eq!(messages[0].sender_username, "alice");
    }

    #[tokio::test]
    async fn direct_messages_badge_then_clear_on_open() {
        let backend = Backend::new();
        let (alice_client, _alice_rx) = backend.client();
        let (bob_client, _bob_rx) = backend.client();

        let alice_room = alice_client
            .register("alice@example.com", "secret1", fields("alice"))
            .await
            .unwrap();
        let bob_room = bob_client
            .register("bob@example.com", "secret1", fields("bob"))
            .await
            .unwrap();
        let alice_id = alice_room.principal().id.clone();

        // Alice messages Bob three times while Bob views the public room.
        let bob_profile = alice_room
            .directory()
            .roster()
            .into_iter()
            .find(|p| p.username == "bob")
            .unwrap();
        alice_room.router().select_direct(&bob_profile).await;
        for text in ["one", "two", "three"] {
            alice_room.composer().set_draft(text);
            alice_room.composer().send().await;
        }

        assert_eq!(bob_room.unread().count_for(&alice_id), 3);

        // Opening the conversation marks it read.
        let alice_profile = bob_room.directory().resolve(&alice_id).unwrap();
        bob_room.router().select_direct(&alice_profile).await;
        assert_eq!(bob_room.unread().count_for(&alice_id), 0);
        assert_eq!(bob_room.router().view().messages().len(), 3);
    }

    #[tokio::test]
    async fn presence_flows_between_clients_and_logout_goes_offline_first() {
        let backend = Backend::new();
        let (alice_client, _alice_rx) = backend.client();
        let (bob_client, _bob_rx) = backend.client();

        let alice_room = alice_client
            .register("alice@example.com", "secret1", fields("alice"))
            .await
            .unwrap();
        let bob_room = bob_client
            .register("bob@example.com", "secret1", fields("bob"))
            .await
            .unwrap();
        let alice_id = alice_room.principal().id.clone();
        let bob_id = bob_room.principal().id.clone();

        assert!(alice_room.presence().is_online(&bob_id));
        assert!(bob_room.presence().is_online(&alice_id));

        alice_client.logout(alice_room).await.unwrap();
        assert_eq!(
            bob_room.presence().state_of(&alice_id),
            PresenceState::Offline,
        );
        assert_eq!(alice_client.session().current(), None);
    }

    #[tokio::test]
    async fn a_dropped_connection_flips_presence_without_client_action() {
        let backend = Backend::new();
        let (alice_client, _alice_rx) = backend.client();
        let (bob_client, _bob_rx) = backend.client();

        let alice_room = alice_client
            .register("alice@example.com", "secret1", fields("alice"))
            .await
            .unwrap();
        let bob_room = bob_client
            .register("bob@example.com", "secret1", fields("bob"))
            .await
            .unwrap();
        let alice_id = alice_room.principal().id.clone();

        // Simulated crash: no logout, the store-side hook fires.
        backend.presence.drop_connection(&alice_id);
        assert_eq!(
            bob_room.presence().state_of(&alice_id),
            PresenceState::Offline,
        );
    }

    #[tokio::test]
    async fn rooms_see_each_other_in_the_roster_but_not_themselves() {
        let backend = Backend::new();
        let (alice_client, _alice_rx) = backend.client();
        let (bob_client, _bob_rx) = backend.client();

        let alice_room = alice_client
            .register("alice@example.com", "secret1", fields("alice"))
            .await
            .unwrap();
        let bob_room = bob_client
            .register("bob@example.com", "secret1", fields("bob"))
            .await
            .unwrap();

        let alice_sees: Vec<String> = alice_room
            .directory()
            .roster()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(alice_sees, vec!["bob".to_string()]);

        let bob_sees: Vec<String> = bob_room
            .directory()
            .roster()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(bob_sees, vec!["alice".to_string()]);
    }
}
