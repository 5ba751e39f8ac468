use std::sync::{Arc, OnceLock};

use clerk_rs::ClerkConfiguration;
use clerk_rs::clerk::Clerk;
use clerk_rs::validators::authorizer::validate_jwt;
use clerk_rs::validators::jwks::MemoryCacheJwksProvider;

use crate::claims::IdentityClaims;
use crate::error::AuthError;

/// Process-scoped JWKS provider cache.
///
/// Bound to the `secret_key` of the first `validate()` call; the
/// `MemoryCacheJwksProvider` caches public keys for 1 hour. One secret key per
/// process is assumed.
static JWKS_PROVIDER: OnceLock<Arc<MemoryCacheJwksProvider>> = OnceLock::new();

fn get_or_init_provider(secret_key: &str) -> Arc<MemoryCacheJwksProvider> {
    JWKS_PROVIDER
        .get_or_init(|| {
            let config = ClerkConfiguration::new(None, None, Some(secret_key.to_string()), None);
            let clerk = Clerk::new(config);
            Arc::new(MemoryCacheJwksProvider::new(clerk))
        })
        .clone()
}

/// Validate a Clerk JWT via JWKS and extract identity claims.
///
/// # Errors
///
/// Returns `AuthError::JwksValidation` if the token is invalid, expired,
/// or the JWKS endpoint is unreachable.
pub async fn validate(jwt: &str, secret_key: &str) -> Result<IdentityClaims, AuthError> {
    let provider = get_or_init_provider(secret_key);
    let clerk_jwt = validate_jwt(jwt, provider)
        .await
        .map_err(|e| AuthError::JwksValidation(e.to_string()))?;

    let expires_at = chrono::DateTime::from_timestamp(i64::from(clerk_jwt.exp), 0)
        .ok_or_else(|| AuthError::JwksValidation("invalid exp timestamp".into()))?;

    Ok(IdentityClaims {
        raw_jwt: jwt.to_string(),
        user_id: clerk_jwt.sub.clone(),
        session_id: clerk_jwt.sid.clone(),
        expires_at,
    })
}
