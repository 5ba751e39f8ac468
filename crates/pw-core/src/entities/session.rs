use serde::{Deserialize, Serialize};

/// Authorization session accepted by the persistence backend.
///
/// Derived from the identity provider's bearer token by the session bridge.
/// The backend has no refresh flow of its own, so `refresh_token` mirrors
/// `access_token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
}

impl BackendSession {
    #[must_use]
    pub fn from_identity_token(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            refresh_token: token.clone(),
            access_token: token,
            user_id: user_id.into(),
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for BackendSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSession")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}
