use async_trait::async_trait;
use pw_core::BackendSession;
use tokio::sync::watch;

use crate::error::AuthError;

/// The signed-in user and the identity token currently issued for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub user_id: String,
    pub token: String,
}

/// Source of the signed-in user and their identity tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// User ID of the current identity session, if any.
    fn current_user_id(&self) -> Option<String>;

    /// Identity token for the current session.
    ///
    /// With `force_refresh`, a newly minted token is returned rather than a
    /// cached one.
    async fn fresh_token(&self, force_refresh: bool) -> Result<String, AuthError>;

    /// Observe identity changes.
    ///
    /// Fires on sign-in, sign-out, user switch, and whenever the token for the
    /// same user is replaced. A token minted by `fresh_token(true)` is
    /// recorded in the value without notifying: its caller already holds it.
    fn subscribe(&self) -> watch::Receiver<Option<SignedIn>>;
}

/// The data backend's session slot.
#[async_trait]
pub trait BackendSessionStore: Send + Sync {
    async fn set_session(&self, session: &BackendSession) -> Result<(), AuthError>;

    async fn clear_session(&self) -> Result<(), AuthError>;

    async fn current_session(&self) -> Option<BackendSession>;
}
