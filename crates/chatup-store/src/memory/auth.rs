use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use chatup_shared::constants::MIN_PASSWORD_LEN;
use chatup_shared::{AuthError, Principal, UserId};

use crate::auth::{AuthClient, AuthListener};
use crate::subscription::{ListenerSet, Subscription};

struct Account {
    principal: Principal,
    password: String,
    disabled: bool,
}

/// In-memory stand-in for the hosted auth service.
#[derive(Clone, Default)]
pub struct MemoryAuth {
    inner: Arc<AuthInner>,
}

#[derive(Default)]
struct AuthInner {
    /// Accounts keyed by email.
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<Principal>>,
    listeners: ListenerSet<dyn Fn(Option<&Principal>) + Send + Sync>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an account disabled; signing in then fails with
    /// [`AuthError::UserDisabled`].
    pub fn disable(&self, email: &str) {
        if let Ok(mut accounts) = self.inner.accounts.lock() {
            if let Some(account) = accounts.get_mut(email) {
                account.disabled = true;
            }
        }
    }

    fn set_current(&self, principal: Option<Principal>) {
        if let Ok(mut current) = self.inner.current.lock() {
            *current = principal.clone();
        }
        for listener in self.inner.listeners.snapshot() {
            listener(principal.as_ref());
        }
    }
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[async_trait]
impl AuthClient for MemoryAuth {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        if !valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }

        let principal = {
            let accounts = self
                .inner
                .accounts
                .lock()
                .map_err(|_| AuthError::Unknown("account table poisoned".to_string()))?;

            // An unknown email and a wrong password are indistinguishable
            // to the caller.
            let Some(account) = accounts.get(email) else {
                return Err(AuthError::InvalidCredentials);
            };
            if account.disabled {
                return Err(AuthError::UserDisabled);
            }
            if account.password != password {
                return Err(AuthError::InvalidCredentials);
            }
            account.principal.clone()
        };

        info!(user = %principal.id, "signed in");
        self.set_current(Some(principal.clone()));
        Ok(principal)
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        if !valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let principal = {
            let mut accounts = self
                .inner
                .accounts
                .lock()
                .map_err(|_| AuthError::Unknown("account table poisoned".to_string()))?;

            if accounts.contains_key(email) {
                return Err(AuthError::EmailInUse);
            }

            let principal = Principal {
                id: UserId::new(Uuid::new_v4().to_string()),
                email: email.to_string(),
                display_name: None,
                username: None,
            };
            accounts.insert(
                email.to_string(),
                Account {
                    principal: principal.clone(),
                    password: password.to_string(),
                    disabled: false,
                },
            );
            principal
        };

        info!(user = %principal.id, email = %email, "account created");
        self.set_current(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        info!("signed out");
        self.set_current(None);
        Ok(())
    }

    fn current(&self) -> Option<Principal> {
        self.inner.current.lock().ok().and_then(|c| c.clone())
    }

    fn subscribe(&self, listener: AuthListener) -> Subscription {
        let id = self.inner.listeners.insert(listener.clone());
        // Initial resolution: report the current state before returning.
        listener(self.current().as_ref());
        let inner = self.inner.clone();
        Subscription::new(id, move || inner.listeners.remove(&id))
    }
}
