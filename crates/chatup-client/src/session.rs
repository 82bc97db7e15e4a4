//! Identity session over the auth collaborator.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use chatup_shared::{AuthError, Principal, Profile};
use chatup_store::{AuthClient, ChatStore, Subscription};

use crate::events::{emit, ClientEvent, EventSink};

/// Profile fields collected by the registration form.
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub username: String,
    pub full_name: String,
}

/// Tracks the signed-in principal and exposes login / register / logout.
pub struct Session {
    auth: Arc<dyn AuthClient>,
    store: Arc<dyn ChatStore>,
    inner: Arc<Mutex<SessionInner>>,
    _auth_sub: Subscription,
}

struct SessionInner {
    current: Option<Principal>,
    loading: bool,
}

impl Session {
    pub fn new(auth: Arc<dyn AuthClient>, store: Arc<dyn ChatStore>, events: EventSink) -> Self {
        let inner = Arc::new(Mutex::new(SessionInner {
            current: None,
            loading: true,
        }));

        let listener_inner = inner.clone();
        let auth_sub = auth.subscribe(Arc::new(move |principal: Option<&Principal>| {
            if let Ok(mut state) = listener_inner.lock() {
                state.current = principal.cloned();
                state.loading = false;
            }
            emit(
                &events,
                ClientEvent::AuthStateChanged {
                    signed_in: principal.is_some(),
                },
            );
        }));

        Self {
            auth,
            store,
            inner,
            _auth_sub: auth_sub,
        }
    }

    /// `true` until the auth collaborator has reported an initial state.
    /// Consumers must not render protected views while this holds.
    pub fn is_loading(&self) -> bool {
        self.inner.lock().map(|state| state.loading).unwrap_or(true)
    }

    pub fn current(&self) -> Option<Principal> {
        self.inner.lock().ok().and_then(|state| state.current.clone())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let principal = self.auth.authenticate(email, password).await?;
        self.ensure_profile(&principal, None).await;
        Ok(principal)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        fields: ProfileFields,
    ) -> Result<Principal, AuthError> {
        let principal = self.auth.create_account(email, password).await?;
        self.ensure_profile(&principal, Some(fields)).await;
        Ok(principal)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        info!("signing out");
        self.auth.sign_out().await
    }

    /// Create the principal's profile document if it does not exist yet.
    /// Runs on login as well as registration and never overwrites. A
    /// failure degrades display fields but must not block chat.
    async fn ensure_profile(&self, principal: &Principal, fields: Option<ProfileFields>) {
        let profile = profile_for(principal, fields);
        if let Err(e) = self.store.create_profile_if_absent(&profile).await {
            warn!(user = %principal.id, error = %e, "profile creation failed");
        }
    }
}

/// Derive the profile document for a principal. Registration supplies the
/// fields; on plain login the email local part fills any gaps.
fn profile_for(principal: &Principal, fields: Option<ProfileFields>) -> Profile {
    match fields {
        Some(f) => Profile {
            id: principal.id.clone(),
            username: f.username,
            full_name: f.full_name,
            email: principal.email.clone(),
        },
        None => {
            let local_part = principal
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string();
            Profile {
                id: principal.id.clone(),
                username: principal.username.clone().unwrap_or_else(|| local_part.clone()),
                full_name: principal.display_name.clone().unwrap_or(local_part),
                email: principal.email.clone(),
            }
        }
    }
}
