use base64::Engine as _;

use crate::claims::IdentityClaims;
use crate::error::AuthError;
use crate::token_store::SecretSlot;

/// Tokens expiring within this window are treated as expired.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// Check if the stored identity token is still valid.
///
/// Returns `Some(claims)` if the token is valid and not near-expiry.
/// Returns `None` if no token is stored, or the token is expired/near-expiry.
///
/// # Errors
///
/// Returns `AuthError` if JWKS validation encounters a network or parsing error
/// (distinct from an expired token, which returns `Ok(None)`).
pub async fn check_stored_token(secret_key: &str) -> Result<Option<IdentityClaims>, AuthError> {
    let Some(jwt) = SecretSlot::IDENTITY_TOKEN.load() else {
        return Ok(None);
    };

    // Skip the JWKS round-trip for tokens that are already stale.
    if decode_expiry(&jwt).is_ok_and(|exp| exp <= chrono::Utc::now()) {
        tracing::debug!("stored identity token already expired");
        return Ok(None);
    }

    let claims = crate::jwks::validate(&jwt, secret_key).await?;
    if claims.is_near_expiry(EXPIRY_BUFFER_SECS) {
        tracing::warn!(
            expires_at = %claims.expires_at,
            "auth token expires within {EXPIRY_BUFFER_SECS}s — re-authenticate with `pwt auth login`",
        );
        return Ok(None);
    }

    Ok(Some(claims))
}

/// Decode the JWT payload without verifying the signature.
///
/// Best-effort only. Use `check_stored_token()` for full validation.
fn decode_payload(jwt: &str) -> Result<serde_json::Value, AuthError> {
    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::Other("invalid JWT format".into()));
    }
    let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| AuthError::Other(format!("base64 decode failed: {e}")))?;
    serde_json::from_slice(&payload).map_err(|e| AuthError::Other(format!("JSON parse failed: {e}")))
}

/// Decode JWT `exp` claim without full JWKS validation (for quick expiry checks).
///
/// # Errors
///
/// Returns `AuthError::Other` if the JWT format is invalid or the `exp` claim
/// is missing or cannot be parsed.
pub fn decode_expiry(jwt: &str) -> Result<chrono::DateTime<chrono::Utc>, AuthError> {
    let value = decode_payload(jwt)?;
    let exp = value["exp"]
        .as_i64()
        .ok_or_else(|| AuthError::Other("missing exp claim".into()))?;
    chrono::DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| AuthError::Other("invalid exp timestamp".into()))
}
