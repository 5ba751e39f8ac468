use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::provider::{IdentityProvider, SignedIn};

/// User ID used when no identity service is configured.
pub const LOCAL_USER_ID: &str = "local";

/// Single fixed identity for offline use. Always signed in.
pub struct LocalIdentity {
    user_id: String,
    signed_in: watch::Sender<Option<SignedIn>>,
}

impl LocalIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::with_user(LOCAL_USER_ID)
    }

    #[must_use]
    pub fn with_user(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let signed_in = SignedIn {
            token: local_token(&user_id),
            user_id: user_id.clone(),
        };
        Self {
            signed_in: watch::Sender::new(Some(signed_in)),
            user_id,
        }
    }
}

fn local_token(user_id: &str) -> String {
    format!("local:{user_id}")
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    fn current_user_id(&self) -> Option<String> {
        Some(self.user_id.clone())
    }

    async fn fresh_token(&self, _force_refresh: bool) -> Result<String, AuthError> {
        Ok(local_token(&self.user_id))
    }

    fn subscribe(&self) -> watch::Receiver<Option<SignedIn>> {
        self.signed_in.subscribe()
    }
}
