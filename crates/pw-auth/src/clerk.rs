//! Clerk-backed identity provider.
//!
//! Holds the current identity claims, mints fresh session tokens through the
//! Clerk Backend API, and persists the latest JWT in the identity [`SecretSlot`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::watch;

use crate::claims::IdentityClaims;
use crate::error::AuthError;
use crate::provider::{IdentityProvider, SignedIn};
use crate::refresh::{EXPIRY_BUFFER_SECS, decode_expiry};
use crate::token_store::SecretSlot;

const CLERK_API_BASE: &str = "https://api.clerk.com/v1";

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    jwt: String,
}

pub struct ClerkIdentity {
    secret_key: String,
    token_template: Option<String>,
    api_base: String,
    http: reqwest::Client,
    slot: Option<SecretSlot>,
    claims: watch::Sender<Option<IdentityClaims>>,
    signed_in: watch::Sender<Option<SignedIn>>,
}

impl ClerkIdentity {
    /// Signed-out provider that persists tokens in the identity slot.
    #[must_use]
    pub fn new(secret_key: impl Into<String>, token_template: Option<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            token_template,
            api_base: CLERK_API_BASE.to_string(),
            http: reqwest::Client::new(),
            slot: Some(SecretSlot::IDENTITY_TOKEN),
            claims: watch::Sender::new(None),
            signed_in: watch::Sender::new(None),
        }
    }

    /// Point Backend API calls somewhere else (tests, proxies).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Keep tokens in memory only.
    #[must_use]
    pub fn in_memory(mut self) -> Self {
        self.slot = None;
        self
    }

    #[must_use]
    pub fn claims(&self) -> Option<IdentityClaims> {
        self.claims.borrow().clone()
    }

    /// Load and validate the stored token, signing in if it is still good.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if JWKS validation fails for a reason other than expiry.
    pub async fn restore(&self) -> Result<Option<IdentityClaims>, AuthError> {
        if self.slot.is_none() {
            return Ok(None);
        }
        let claims = crate::refresh::check_stored_token(&self.secret_key).await?;
        if let Some(claims) = &claims {
            tracing::debug!(user_id = %claims.user_id, "restored identity session");
            self.publish(Some(claims.clone()));
        }
        Ok(claims)
    }

    /// Adopt already-validated claims as the current session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the token cannot be persisted.
    pub fn sign_in(&self, claims: IdentityClaims) -> Result<(), AuthError> {
        if let Some(slot) = &self.slot {
            slot.store(&claims.raw_jwt)?;
        }
        self.publish(Some(claims));
        Ok(())
    }

    /// Interactive browser sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the browser flow, validation, or storage fails.
    pub async fn sign_in_with_browser(
        &self,
        frontend_api: &str,
        timeout: Duration,
    ) -> Result<IdentityClaims, AuthError> {
        let jwt = crate::browser_flow::login(frontend_api, timeout).await?;
        let claims = crate::jwks::validate(&jwt, &self.secret_key).await?;
        self.sign_in(claims.clone())?;
        Ok(claims)
    }

    /// Headless sign-in for CI: create a Clerk session for `user_id` and mint
    /// a JWT for it.
    ///
    /// The secret key has full backend access. It is only used to mint the
    /// token and is never stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ApiKeyFailed` if session creation or JWT minting fails.
    pub async fn sign_in_with_secret_key(&self, user_id: &str) -> Result<IdentityClaims, AuthError> {
        let session: SessionResponse = self
            .http
            .post(format!("{}/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await
            .map_err(|e| AuthError::ApiKeyFailed(format!("create session: {e}")))?
            .error_for_status()
            .map_err(|e| AuthError::ApiKeyFailed(format!("create session: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::ApiKeyFailed(format!("parse session: {e}")))?;

        let jwt = self
            .mint(&session.id)
            .await
            .map_err(|e| AuthError::ApiKeyFailed(e.to_string()))?;
        let claims = crate::jwks::validate(&jwt, &self.secret_key).await?;
        self.sign_in(claims.clone())?;
        Ok(claims)
    }

    /// Forget the current session and its stored token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the stored token cannot be removed.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.publish(None);
        if let Some(slot) = &self.slot {
            slot.delete()?;
        }
        Ok(())
    }

    /// Replace the session. Subscribers hear about it when the user or the
    /// token differs from what they last saw.
    fn publish(&self, claims: Option<IdentityClaims>) {
        let next = claims.as_ref().map(IdentityClaims::signed_in);
        self.claims.send_replace(claims);
        self.signed_in.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    /// Record a re-minted token for `user_id`, notifying only when `announce`.
    fn record_token(&self, user_id: &str, token: &str, announce: bool) {
        self.signed_in.send_if_modified(|current| match current {
            Some(active) if active.user_id == user_id && active.token != token => {
                token.clone_into(&mut active.token);
                announce
            }
            _ => false,
        });
    }

    /// `POST /sessions/{sid}/tokens[/{template}]`
    async fn mint(&self, session_id: &str) -> Result<String, AuthError> {
        let url = match &self.token_template {
            Some(template) => format!("{}/sessions/{session_id}/tokens/{template}", self.api_base),
            None => format!("{}/sessions/{session_id}/tokens", self.api_base),
        };
        let token: TokenResponse = self
            .http
            .post(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AuthError::ClerkApiError(format!("mint token: {e}")))?
            .error_for_status()
            .map_err(|e| AuthError::ClerkApiError(format!("mint token: {e}")))?
            .json()
            .await
            .map_err(|e| AuthError::ClerkApiError(format!("parse token: {e}")))?;
        Ok(token.jwt)
    }
}

#[async_trait]
impl IdentityProvider for ClerkIdentity {
    fn current_user_id(&self) -> Option<String> {
        self.claims.borrow().as_ref().map(|c| c.user_id.clone())
    }

    async fn fresh_token(&self, force_refresh: bool) -> Result<String, AuthError> {
        let current = self.claims().ok_or(AuthError::NotAuthenticated)?;
        let near_expiry = current.is_near_expiry(EXPIRY_BUFFER_SECS);
        if !force_refresh && !near_expiry {
            return Ok(current.raw_jwt);
        }

        let Some(session_id) = current.session_id.clone() else {
            if near_expiry {
                return Err(AuthError::TokenExpired);
            }
            tracing::warn!("identity token carries no session id; reusing it instead of minting");
            return Ok(current.raw_jwt);
        };

        let jwt = self.mint(&session_id).await?;
        // Minted by the Backend API over an authenticated channel, so the
        // payload is trusted without a JWKS round-trip.
        let expires_at = decode_expiry(&jwt)?;
        let refreshed = IdentityClaims {
            raw_jwt: jwt.clone(),
            user_id: current.user_id,
            session_id: Some(session_id),
            expires_at,
        };

        let user_id = refreshed.user_id.clone();

        // Signed out or switched user while minting: leave the new state alone.
        let adopted = self.claims.send_if_modified(|slot| match slot {
            Some(existing) if existing.user_id == refreshed.user_id => {
                *existing = refreshed;
                true
            }
            _ => false,
        });
        if adopted {
            // A forced mint is installed by whoever forced it. A mint on
            // expiry is news to subscribers.
            self.record_token(&user_id, &jwt, !force_refresh);
            if let Some(slot) = &self.slot
                && let Err(error) = slot.store(&jwt)
            {
                tracing::warn!(%error, "failed to persist refreshed identity token");
            }
        }

        Ok(jwt)
    }

    fn subscribe(&self) -> watch::Receiver<Option<SignedIn>> {
        self.signed_in.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bridge::{BridgeState, SessionBridge};
    use crate::provider::BackendSessionStore;
    use base64::Engine as _;
    use pw_core::BackendSession;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    struct Captured {
        method: String,
        url: String,
        authorization: Option<String>,
    }

    /// Answer exactly one request, returning what was asked.
    fn serve_once(status: u16, body: String) -> (String, std::thread::JoinHandle<Captured>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = std::thread::spawn(move || {
            let request = server.recv().unwrap();
            let captured = Captured {
                method: request.method().to_string(),
                url: request.url().to_string(),
                authorization: request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.to_string()),
            };
            request
                .respond(tiny_http::Response::from_string(body).with_status_code(status))
                .unwrap();
            captured
        });
        (format!("http://127.0.0.1:{port}"), handle)
    }

    fn make_jwt(sub: &str, exp: i64) -> String {
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        format!(
            "{}.{}.{}",
            engine.encode(r#"{"alg":"RS256"}"#),
            engine.encode(format!(r#"{{"sub":"{sub}","exp":{exp}}}"#)),
            engine.encode("sig"),
        )
    }

    fn claims(user_id: &str, session_id: Option<&str>, ttl_secs: i64) -> IdentityClaims {
        let exp = Utc::now().timestamp() + ttl_secs;
        IdentityClaims {
            raw_jwt: make_jwt(user_id, exp),
            user_id: user_id.into(),
            session_id: session_id.map(str::to_string),
            expires_at: chrono::DateTime::from_timestamp(exp, 0).unwrap(),
        }
    }

    fn identity(api_base: &str, template: Option<&str>) -> ClerkIdentity {
        ClerkIdentity::new("sk_test_123", template.map(str::to_string))
            .with_api_base(api_base)
            .in_memory()
    }

    #[tokio::test]
    async fn fresh_token_requires_session() {
        let identity = identity("http://127.0.0.1:9", None);
        let err = identity.fresh_token(true).await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated));
    }

    #[tokio::test]
    async fn unforced_fresh_token_returns_cached_jwt() {
        // Unroutable base: any HTTP call would fail the test.
        let identity = identity("http://127.0.0.1:9", None);
        let current = claims("user_a", Some("sess_a"), 3600);
        identity.sign_in(current.clone()).unwrap();

        assert_eq!(identity.fresh_token(false).await.unwrap(), current.raw_jwt);
    }

    #[tokio::test]
    async fn forced_fresh_token_mints_via_template() {
        let minted = make_jwt("user_a", Utc::now().timestamp() + 7200);
        let (base, handle) = serve_once(200, format!(r#"{{"jwt":"{minted}"}}"#));
        let identity = identity(&base, Some("postwright"));
        identity.sign_in(claims("user_a", Some("sess_a"), 3600)).unwrap();

        let token = identity.fresh_token(true).await.unwrap();
        assert_eq!(token, minted);
        assert_eq!(identity.claims().unwrap().raw_jwt, minted);

        let captured = handle.join().unwrap();
        assert_eq!(captured.method, "POST");
        assert_eq!(captured.url, "/sessions/sess_a/tokens/postwright");
        assert_eq!(captured.authorization.as_deref(), Some("Bearer sk_test_123"));
    }

    #[tokio::test]
    async fn forced_fresh_token_without_template_uses_default_route() {
        let minted = make_jwt("user_a", Utc::now().timestamp() + 7200);
        let (base, handle) = serve_once(200, format!(r#"{{"jwt":"{minted}"}}"#));
        let identity = identity(&base, None);
        identity.sign_in(claims("user_a", Some("sess_a"), 3600)).unwrap();

        identity.fresh_token(true).await.unwrap();
        assert_eq!(handle.join().unwrap().url, "/sessions/sess_a/tokens");
    }

    #[tokio::test]
    async fn mint_failure_is_clerk_api_error() {
        let (base, handle) = serve_once(500, r#"{"errors":[]}"#.into());
        let identity = identity(&base, None);
        identity.sign_in(claims("user_a", Some("sess_a"), 3600)).unwrap();

        let err = identity.fresh_token(true).await.unwrap_err();
        assert!(matches!(err, AuthError::ClerkApiError(_)), "got {err:?}");
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn expired_token_without_session_id_is_rejected() {
        let identity = identity("http://127.0.0.1:9", None);
        identity.sign_in(claims("user_a", None, -10)).unwrap();

        let err = identity.fresh_token(false).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn subscribers_see_user_and_token_changes() {
        let identity = identity("http://127.0.0.1:9", None);
        let mut rx = identity.subscribe();
        assert_eq!(*rx.borrow_and_update(), None);

        let first = claims("user_a", Some("sess_a"), 3600);
        identity.sign_in(first.clone()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(first.signed_in()));

        identity.sign_in(first.clone()).unwrap();
        assert!(!rx.has_changed().unwrap());

        let rotated = claims("user_a", Some("sess_a"), 7200);
        identity.sign_in(rotated.clone()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(rotated.signed_in()));

        identity.sign_out().unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), None);
        assert_eq!(identity.current_user_id(), None);
    }

    #[tokio::test]
    async fn forced_mint_is_recorded_without_notifying() {
        let minted = make_jwt("user_a", Utc::now().timestamp() + 7200);
        let (base, handle) = serve_once(200, format!(r#"{{"jwt":"{minted}"}}"#));
        let identity = identity(&base, None);
        identity.sign_in(claims("user_a", Some("sess_a"), 3600)).unwrap();
        let rx = identity.subscribe();

        identity.fresh_token(true).await.unwrap();

        assert!(!rx.has_changed().unwrap());
        assert_eq!(rx.borrow().as_ref().map(|s| s.token.clone()), Some(minted));
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn mint_on_expiry_notifies_subscribers() {
        let minted = make_jwt("user_a", Utc::now().timestamp() + 7200);
        let (base, handle) = serve_once(200, format!(r#"{{"jwt":"{minted}"}}"#));
        let identity = identity(&base, None);
        identity.sign_in(claims("user_a", Some("sess_a"), 30)).unwrap();
        let mut rx = identity.subscribe();

        assert_eq!(identity.fresh_token(false).await.unwrap(), minted);

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|s| s.token.clone()), Some(minted));
        handle.join().unwrap();
    }

    #[derive(Default)]
    struct SlotBackend(std::sync::Mutex<Option<BackendSession>>);

    impl SlotBackend {
        fn token(&self) -> Option<String> {
            self.0.lock().unwrap().as_ref().map(|s| s.access_token.clone())
        }
    }

    #[async_trait]
    impl BackendSessionStore for SlotBackend {
        async fn set_session(&self, session: &BackendSession) -> Result<(), AuthError> {
            *self.0.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn clear_session(&self) -> Result<(), AuthError> {
            *self.0.lock().unwrap() = None;
            Ok(())
        }

        async fn current_session(&self) -> Option<BackendSession> {
            self.0.lock().unwrap().clone()
        }
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn bridge_follows_token_rotation_for_same_user() {
        let identity = Arc::new(identity("http://127.0.0.1:9", None));
        let backend = Arc::new(SlotBackend::default());
        let bridge = Arc::new(SessionBridge::new(Arc::clone(&identity), Arc::clone(&backend)));
        let task = tokio::spawn(Arc::clone(&bridge).run(identity.subscribe()));

        // No `sid`, so the forced refresh on sign-in reuses the token as is.
        let first = claims("user_a", None, 3600);
        identity.sign_in(first.clone()).unwrap();
        wait_for(|| backend.token() == Some(first.raw_jwt.clone())).await;

        let rotated = claims("user_a", None, 7200);
        identity.sign_in(rotated.clone()).unwrap();
        wait_for(|| {
            backend.token() == Some(rotated.raw_jwt.clone())
                && matches!(bridge.state(), BridgeState::Bridged { attempt: 3, .. })
        })
        .await;

        let session = backend.current_session().await.unwrap();
        assert_eq!(session.user_id, "user_a");
        assert_eq!(session.refresh_token, rotated.raw_jwt);
        task.abort();
    }
}
