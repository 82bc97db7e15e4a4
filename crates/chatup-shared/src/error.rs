use thiserror::Error;

/// Umbrella error for the client core.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Failures surfaced by the auth collaborator.
///
/// Account-not-found and wrong-password are deliberately merged into
/// [`AuthError::InvalidCredentials`] so a caller cannot probe which emails
/// are registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email address format")]
    InvalidEmail,

    #[error("This user account has been disabled")]
    UserDisabled,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("This email is already registered")]
    EmailInUse,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Authentication failed: {0}")]
    Unknown(String),
}

/// A write was rejected by a collaborator. Not auto-retried; the caller
/// surfaces a notice and keeps the draft.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Write rejected: {0}")]
    Rejected(String),
}

/// A live query failed to establish or was interrupted. Surfaced inline,
/// never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Failed to establish live query: {0}")]
    Establish(String),

    #[error("Live query interrupted: {0}")]
    Interrupted(String),
}

/// Profile document operations. Creation failures are logged and degrade
/// display fields only; they never block chat.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Profile creation failed: {0}")]
    Creation(String),

    #[error("Profile lookup failed: {0}")]
    Lookup(String),
}
