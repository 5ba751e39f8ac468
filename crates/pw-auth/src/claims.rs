use chrono::{DateTime, TimeDelta, Utc};

use crate::provider::SignedIn;

/// A Clerk session token and the claims the bridge cares about.
///
/// Built by JWKS validation on sign-in and by payload decoding after a mint.
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    /// The JWT itself. Installed as the backend access token.
    pub raw_jwt: String,
    /// `sub`
    pub user_id: String,
    /// `sid`. Tokens without one cannot be re-minted.
    pub session_id: Option<String>,
    /// `exp`
    pub expires_at: DateTime<Utc>,
}

impl IdentityClaims {
    /// True once `exp` is less than `buffer_secs` away.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.expires_at <= Utc::now() + TimeDelta::seconds(buffer_secs)
    }

    #[must_use]
    pub fn signed_in(&self) -> SignedIn {
        SignedIn {
            user_id: self.user_id.clone(),
            token: self.raw_jwt.clone(),
        }
    }
}
