//! The hosted auth-service seam.

use std::sync::Arc;

use async_trait::async_trait;

use chatup_shared::{AuthError, Principal};

use crate::subscription::Subscription;

/// Callback receiving the current principal, or `None` when signed out.
pub type AuthListener = Arc<dyn Fn(Option<&Principal>) + Send + Sync>;

/// Operations of the external auth service.
///
/// Implementations must invoke a freshly registered listener once with the
/// current state before [`AuthClient::subscribe`] returns; that first call
/// is the initial-resolution signal consumers gate their loading flag on.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Sign in with email and password.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Create a new account. The principal is signed in on success.
    async fn create_account(&self, email: &str, password: &str) -> Result<Principal, AuthError>;

    /// Sign the current principal out.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Snapshot of the currently signed-in principal.
    fn current(&self) -> Option<Principal>;

    /// Register for auth-state changes.
    fn subscribe(&self, listener: AuthListener) -> Subscription;
}
