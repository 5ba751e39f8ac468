//! Identity-to-backend session bridge.
//!
//! Keeps the backend's session slot in step with the identity provider: every
//! identity change or token rotation becomes a numbered *attempt*, and
//! whichever attempt was issued last decides what the backend ends up
//! holding, no matter which attempt finishes first.
//!
//! ```text
//! user change    ──► attempt n ──► fresh_token(force) ──┐
//! token rotation ──► attempt n ──► rotated token ───────┤
//!                                                       ▼
//!                                                 [install lock]
//!                                                       │ still newest? ──no──► Superseded
//!                                                       ▼
//!                                                  set_session ──fail──► BridgeFailed, clear, retry once
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use pw_core::BackendSession;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::provider::{BackendSessionStore, IdentityProvider, SignedIn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BridgeState {
    Unauthenticated,
    Authenticating { attempt: u64, user_id: String },
    Bridged { attempt: u64, user_id: String },
    BridgeFailed { attempt: u64, user_id: String, reason: String },
}

impl BridgeState {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating { .. } => "authenticating",
            Self::Bridged { .. } => "bridged",
            Self::BridgeFailed { .. } => "bridge_failed",
        }
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("attempt {attempt}: could not obtain identity token: {source}")]
    TokenRetrieval {
        attempt: u64,
        #[source]
        source: AuthError,
    },

    #[error("attempt {attempt}: backend session install failed after {attempts} tries: {reason}")]
    Install {
        attempt: u64,
        attempts: u8,
        reason: String,
    },

    #[error("attempt {attempt} superseded by attempt {latest}")]
    Superseded { attempt: u64, latest: u64 },
}

/// Attempt counter and published state, updated together.
#[derive(Debug)]
struct Ledger {
    latest: u64,
    state: BridgeState,
}

pub struct SessionBridge<I: ?Sized, B: ?Sized> {
    identity: Arc<I>,
    backend: Arc<B>,
    ledger: Mutex<Ledger>,
    /// Serialises `set_session` / `clear_session`.
    install_lock: tokio::sync::Mutex<()>,
}

impl<I, B> SessionBridge<I, B>
where
    I: IdentityProvider + ?Sized,
    B: BackendSessionStore + ?Sized,
{
    pub fn new(identity: Arc<I>, backend: Arc<B>) -> Self {
        Self {
            identity,
            backend,
            ledger: Mutex::new(Ledger {
                latest: 0,
                state: BridgeState::Unauthenticated,
            }),
            install_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.ledger().state.clone()
    }

    pub fn attempts_issued(&self) -> u64 {
        self.ledger().latest
    }

    /// React to an identity change.
    ///
    /// The attempt number is taken when this is called, not when the returned
    /// future is first polled.
    pub fn on_identity_change(
        &self,
        user_id: Option<String>,
    ) -> impl Future<Output = Result<BridgeState, BridgeError>> + Send + '_ {
        let attempt = self.issue();
        self.execute(attempt, user_id)
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self) -> u64 {
        let mut ledger = self.ledger();
        ledger.latest += 1;
        ledger.latest
    }

    fn ensure_newest(&self, attempt: u64) -> Result<(), BridgeError> {
        let latest = self.ledger().latest;
        if latest == attempt {
            Ok(())
        } else {
            tracing::debug!(attempt, latest, "bridge attempt superseded");
            Err(BridgeError::Superseded { attempt, latest })
        }
    }

    /// Publish `state` if `attempt` is still the newest.
    fn transition(&self, attempt: u64, state: BridgeState) -> Result<BridgeState, BridgeError> {
        let mut ledger = self.ledger();
        if ledger.latest != attempt {
            return Err(BridgeError::Superseded {
                attempt,
                latest: ledger.latest,
            });
        }
        tracing::debug!(attempt, from = ledger.state.label(), to = state.label(), "bridge transition");
        ledger.state = state.clone();
        Ok(state)
    }

    async fn execute(&self, attempt: u64, user_id: Option<String>) -> Result<BridgeState, BridgeError> {
        match user_id {
            Some(user_id) => self.bridge(attempt, user_id).await,
            None => self.sign_out(attempt).await,
        }
    }

    async fn sign_out(&self, attempt: u64) -> Result<BridgeState, BridgeError> {
        let _guard = self.install_lock.lock().await;
        self.ensure_newest(attempt)?;
        if let Err(error) = self.backend.clear_session().await {
            tracing::debug!(attempt, %error, "ignoring backend clear failure on sign-out");
        }
        self.transition(attempt, BridgeState::Unauthenticated)
    }

    async fn bridge(&self, attempt: u64, user_id: String) -> Result<BridgeState, BridgeError> {
        self.transition(
            attempt,
            BridgeState::Authenticating {
                attempt,
                user_id: user_id.clone(),
            },
        )?;

        let token = match self.identity.fresh_token(true).await {
            Ok(token) => token,
            Err(source) => {
                tracing::warn!(attempt, %user_id, error = %source, "identity token retrieval failed; backend session left as is");
                self.transition(
                    attempt,
                    BridgeState::BridgeFailed {
                        attempt,
                        user_id,
                        reason: source.to_string(),
                    },
                )?;
                return Err(BridgeError::TokenRetrieval { attempt, source });
            }
        };
        let session = BackendSession::from_identity_token(user_id.clone(), token);
        self.install(attempt, user_id, &session).await
    }

    /// Install a new token for the user already signed in, as given.
    async fn rotate(&self, attempt: u64, user_id: String, token: String) -> Result<BridgeState, BridgeError> {
        self.transition(
            attempt,
            BridgeState::Authenticating {
                attempt,
                user_id: user_id.clone(),
            },
        )?;
        tracing::debug!(attempt, %user_id, "identity token rotated");
        let session = BackendSession::from_identity_token(user_id.clone(), token);
        self.install(attempt, user_id, &session).await
    }

    /// Install `session`, retrying once after a best-effort clear.
    async fn install(
        &self,
        attempt: u64,
        user_id: String,
        session: &BackendSession,
    ) -> Result<BridgeState, BridgeError> {
        let _guard = self.install_lock.lock().await;
        self.ensure_newest(attempt)?;
        if let Err(first) = self.backend.set_session(session).await {
            tracing::warn!(attempt, error = %first, "backend session install failed; clearing and retrying once");
            self.transition(
                attempt,
                BridgeState::BridgeFailed {
                    attempt,
                    user_id: user_id.clone(),
                    reason: first.to_string(),
                },
            )?;
            if let Err(error) = self.backend.clear_session().await {
                tracing::debug!(attempt, %error, "ignoring backend clear failure before retry");
            }
            self.ensure_newest(attempt)?;
            if let Err(second) = self.backend.set_session(session).await {
                let reason = second.to_string();
                tracing::warn!(attempt, %user_id, error = %reason, "backend session install failed twice");
                self.transition(
                    attempt,
                    BridgeState::BridgeFailed {
                        attempt,
                        user_id,
                        reason: reason.clone(),
                    },
                )?;
                return Err(BridgeError::Install {
                    attempt,
                    attempts: 2,
                    reason,
                });
            }
        }

        // A newer attempt issued during the install waits on the lock and
        // replaces this session; this one reports Superseded.
        self.transition(attempt, BridgeState::Bridged { attempt, user_id })
    }
}

impl<I, B> SessionBridge<I, B>
where
    I: IdentityProvider + ?Sized + 'static,
    B: BackendSessionStore + ?Sized + 'static,
{
    /// Drive the bridge from an identity subscription until the sender is dropped.
    ///
    /// The current value is handled first. A new token for the same user is
    /// installed as a rotation; anything else is an identity change. Each
    /// attempt runs on its own task.
    pub async fn run(self: Arc<Self>, mut changes: watch::Receiver<Option<SignedIn>>) {
        let mut previous: Option<SignedIn> = None;
        loop {
            let current = changes.borrow_and_update().clone();
            let attempt = self.issue();
            let rotation = match (&previous, &current) {
                (Some(before), Some(now)) if before.user_id == now.user_id => Some(now.clone()),
                _ => None,
            };
            let user_id = current.as_ref().map(|signed_in| signed_in.user_id.clone());
            previous = current;

            let bridge = Arc::clone(&self);
            tokio::spawn(async move {
                let result = match rotation {
                    Some(signed_in) => bridge.rotate(attempt, signed_in.user_id, signed_in.token).await,
                    None => bridge.execute(attempt, user_id).await,
                };
                match result {
                    Ok(state) => tracing::debug!(attempt, state = state.label(), "bridge attempt finished"),
                    Err(BridgeError::Superseded { .. }) => {}
                    Err(error) => tracing::warn!(%error, "bridge attempt failed"),
                }
            });
            if changes.changed().await.is_err() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    use super::*;

    type Gate = Option<oneshot::Receiver<()>>;

    /// Hands out queued tokens, each optionally held back until its gate opens.
    struct FakeIdentity {
        tokens: Mutex<VecDeque<(Result<String, AuthError>, Gate)>>,
        forced: AtomicU32,
        signed_in: watch::Sender<Option<SignedIn>>,
    }

    impl FakeIdentity {
        fn new() -> Self {
            Self {
                tokens: Mutex::new(VecDeque::new()),
                forced: AtomicU32::new(0),
                signed_in: watch::Sender::new(None),
            }
        }

        fn push(&self, token: &str) {
            self.tokens.lock().unwrap().push_back((Ok(token.into()), None));
        }

        fn push_failure(&self) {
            self.tokens
                .lock()
                .unwrap()
                .push_back((Err(AuthError::ClerkApiError("mint failed".into())), None));
        }

        fn push_gated(&self, token: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.tokens.lock().unwrap().push_back((Ok(token.into()), Some(rx)));
            tx
        }

        fn announce(&self, user_id: &str, token: &str) {
            self.signed_in.send_replace(Some(SignedIn {
                user_id: user_id.into(),
                token: token.into(),
            }));
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        fn current_user_id(&self) -> Option<String> {
            self.signed_in.borrow().as_ref().map(|s| s.user_id.clone())
        }

        async fn fresh_token(&self, force_refresh: bool) -> Result<String, AuthError> {
            if force_refresh {
                self.forced.fetch_add(1, Ordering::SeqCst);
            }
            let next = self.tokens.lock().unwrap().pop_front();
            let (token, gate) = next.unwrap_or_else(|| (Err(AuthError::NotAuthenticated), None));
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            token
        }

        fn subscribe(&self) -> watch::Receiver<Option<SignedIn>> {
            self.signed_in.subscribe()
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        session: Mutex<Option<BackendSession>>,
        set_calls: AtomicU32,
        clear_calls: AtomicU32,
        failing_sets: AtomicU32,
        failing_clear: AtomicBool,
        set_gate: Mutex<Gate>,
        clear_gate: Mutex<Gate>,
    }

    impl FakeBackend {
        fn gate_next_set(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.set_gate.lock().unwrap() = Some(rx);
            tx
        }

        fn gate_next_clear(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.clear_gate.lock().unwrap() = Some(rx);
            tx
        }

        fn user(&self) -> Option<String> {
            self.session.lock().unwrap().as_ref().map(|s| s.user_id.clone())
        }

        fn token(&self) -> Option<String> {
            self.session.lock().unwrap().as_ref().map(|s| s.access_token.clone())
        }
    }

    #[async_trait]
    impl BackendSessionStore for FakeBackend {
        async fn set_session(&self, session: &BackendSession) -> Result<(), AuthError> {
            self.set_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.set_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let failing = self.failing_sets.load(Ordering::SeqCst);
            if failing > 0 {
                self.failing_sets.store(failing - 1, Ordering::SeqCst);
                return Err(AuthError::BackendSession("rejected".into()));
            }
            *self.session.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn clear_session(&self) -> Result<(), AuthError> {
            self.clear_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.clear_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.failing_clear.load(Ordering::SeqCst) {
                return Err(AuthError::BackendSession("clear refused".into()));
            }
            *self.session.lock().unwrap() = None;
            Ok(())
        }

        async fn current_session(&self) -> Option<BackendSession> {
            self.session.lock().unwrap().clone()
        }
    }

    fn bridge() -> (Arc<FakeIdentity>, Arc<FakeBackend>, SessionBridge<FakeIdentity, FakeBackend>) {
        let identity = Arc::new(FakeIdentity::new());
        let backend = Arc::new(FakeBackend::default());
        let bridge = SessionBridge::new(Arc::clone(&identity), Arc::clone(&backend));
        (identity, backend, bridge)
    }

    #[tokio::test]
    async fn sign_in_installs_forced_token() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-a");

        let state = bridge.on_identity_change(Some("user_a".into())).await.unwrap();

        assert_eq!(
            state,
            BridgeState::Bridged {
                attempt: 1,
                user_id: "user_a".into()
            }
        );
        assert_eq!(bridge.state(), state);
        assert_eq!(identity.forced.load(Ordering::SeqCst), 1);
        let session = backend.current_session().await.unwrap();
        assert_eq!(session.access_token, "jwt-a");
        assert_eq!(session.refresh_token, "jwt-a");
        assert_eq!(session.user_id, "user_a");
    }

    #[tokio::test]
    async fn sign_out_clears_backend() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-a");
        bridge.on_identity_change(Some("user_a".into())).await.unwrap();

        let state = bridge.on_identity_change(None).await.unwrap();

        assert_eq!(state, BridgeState::Unauthenticated);
        assert_eq!(backend.user(), None);
        assert_eq!(bridge.attempts_issued(), 2);
    }

    #[tokio::test]
    async fn sign_out_ignores_clear_failure() {
        let (_identity, backend, bridge) = bridge();
        backend.failing_clear.store(true, Ordering::SeqCst);

        let state = bridge.on_identity_change(None).await.unwrap();

        assert_eq!(state, BridgeState::Unauthenticated);
        assert_eq!(backend.clear_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_failure_leaves_previous_session() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-a");
        bridge.on_identity_change(Some("user_a".into())).await.unwrap();
        identity.push_failure();

        let err = bridge.on_identity_change(Some("user_b".into())).await.unwrap_err();

        assert!(matches!(err, BridgeError::TokenRetrieval { attempt: 2, .. }), "got {err:?}");
        assert!(matches!(bridge.state(), BridgeState::BridgeFailed { attempt: 2, .. }));
        assert_eq!(backend.token().as_deref(), Some("jwt-a"));
        assert_eq!(backend.set_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.clear_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn install_failure_retries_once_with_same_token() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-a");
        backend.failing_sets.store(1, Ordering::SeqCst);

        let state = bridge.on_identity_change(Some("user_a".into())).await.unwrap();

        assert!(matches!(state, BridgeState::Bridged { attempt: 1, .. }));
        assert_eq!(backend.set_calls.load(Ordering::SeqCst), 2);
        assert_eq!(backend.clear_calls.load(Ordering::SeqCst), 1);
        assert_eq!(identity.forced.load(Ordering::SeqCst), 1);
        assert_eq!(backend.token().as_deref(), Some("jwt-a"));
    }

    #[tokio::test]
    async fn second_install_failure_gives_up() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-a");
        backend.failing_sets.store(5, Ordering::SeqCst);

        let err = bridge.on_identity_change(Some("user_a".into())).await.unwrap_err();

        assert!(matches!(err, BridgeError::Install { attempt: 1, attempts: 2, .. }), "got {err:?}");
        assert!(matches!(bridge.state(), BridgeState::BridgeFailed { attempt: 1, .. }));
        assert_eq!(backend.set_calls.load(Ordering::SeqCst), 2);
        assert_eq!(backend.user(), None);
    }

    /// Start a sign-in on its own task and wait until it is blocked on its token.
    async fn spawn_pending_sign_in(
        identity: &Arc<FakeIdentity>,
        bridge: &Arc<SessionBridge<FakeIdentity, FakeBackend>>,
        user_id: &str,
    ) -> tokio::task::JoinHandle<Result<BridgeState, BridgeError>> {
        let requested = identity.forced.load(Ordering::SeqCst);
        let task = tokio::spawn({
            let bridge = Arc::clone(bridge);
            let user_id = user_id.to_string();
            async move { bridge.on_identity_change(Some(user_id)).await }
        });
        wait_for(|| identity.forced.load(Ordering::SeqCst) > requested).await;
        task
    }

    #[tokio::test]
    async fn latest_attempt_wins_when_older_finishes_last() {
        let (identity, backend, bridge) = bridge();
        let bridge = Arc::new(bridge);
        let release_a = identity.push_gated("jwt-a");
        identity.push("jwt-b");

        let attempt_a = spawn_pending_sign_in(&identity, &bridge, "user_a").await;
        let result_b = bridge.on_identity_change(Some("user_b".into())).await;
        release_a.send(()).unwrap();
        let result_a = attempt_a.await.unwrap();

        assert_eq!(
            result_b.unwrap(),
            BridgeState::Bridged {
                attempt: 2,
                user_id: "user_b".into()
            }
        );
        assert!(matches!(
            result_a.unwrap_err(),
            BridgeError::Superseded { attempt: 1, latest: 2 }
        ));
        assert_eq!(backend.token().as_deref(), Some("jwt-b"));
        assert_eq!(backend.set_calls.load(Ordering::SeqCst), 1);
        assert!(matches!(bridge.state(), BridgeState::Bridged { attempt: 2, .. }));
    }

    #[tokio::test]
    async fn sign_out_supersedes_in_flight_sign_in() {
        let (identity, backend, bridge) = bridge();
        let bridge = Arc::new(bridge);
        let release_a = identity.push_gated("jwt-a");

        let attempt_a = spawn_pending_sign_in(&identity, &bridge, "user_a").await;
        let result_out = bridge.on_identity_change(None).await;
        release_a.send(()).unwrap();
        let result_a = attempt_a.await.unwrap();

        assert_eq!(result_out.unwrap(), BridgeState::Unauthenticated);
        assert!(matches!(result_a, Err(BridgeError::Superseded { .. })));
        assert_eq!(backend.user(), None);
        assert_eq!(backend.set_calls.load(Ordering::SeqCst), 0);
        assert_eq!(bridge.state(), BridgeState::Unauthenticated);
    }

    #[tokio::test]
    async fn attempts_issued_back_to_back_discard_the_older() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-b");

        // Both issued before either runs: the older one never asks for a token.
        let attempt_a = bridge.on_identity_change(Some("user_a".into()));
        let attempt_b = bridge.on_identity_change(Some("user_b".into()));
        let (result_a, result_b) = tokio::join!(attempt_a, attempt_b);

        assert!(matches!(result_a, Err(BridgeError::Superseded { attempt: 1, latest: 2 })));
        assert!(matches!(result_b, Ok(BridgeState::Bridged { attempt: 2, .. })));
        assert_eq!(identity.forced.load(Ordering::SeqCst), 1);
        assert_eq!(backend.user().as_deref(), Some("user_b"));
    }

    #[tokio::test]
    async fn run_follows_identity_subscription() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-a");
        let bridge = Arc::new(bridge);
        let task = tokio::spawn(Arc::clone(&bridge).run(identity.subscribe()));

        // Initial value (signed out) is handled first.
        wait_for(|| bridge.state() == BridgeState::Unauthenticated && bridge.attempts_issued() == 1).await;

        identity.announce("user_a", "jwt-announced");
        wait_for(|| matches!(bridge.state(), BridgeState::Bridged { .. })).await;
        // A new user always gets a forced token.
        assert_eq!(backend.token().as_deref(), Some("jwt-a"));

        identity.signed_in.send_replace(None);
        wait_for(|| bridge.state() == BridgeState::Unauthenticated).await;
        assert_eq!(backend.user(), None);

        task.abort();
    }

    #[tokio::test]
    async fn run_installs_rotated_token_for_same_user() {
        let (identity, backend, bridge) = bridge();
        identity.push("jwt-1");
        let bridge = Arc::new(bridge);
        identity.announce("user_a", "jwt-1");
        let task = tokio::spawn(Arc::clone(&bridge).run(identity.subscribe()));
        wait_for(|| backend.token().as_deref() == Some("jwt-1")).await;

        identity.announce("user_a", "jwt-2");
        wait_for(|| {
            backend.token().as_deref() == Some("jwt-2")
                && matches!(bridge.state(), BridgeState::Bridged { attempt: 2, .. })
        })
        .await;

        assert_eq!(identity.forced.load(Ordering::SeqCst), 1);
        task.abort();
    }

    #[tokio::test]
    async fn failed_install_is_published_before_retry() {
        let (identity, backend, bridge) = bridge();
        let bridge = Arc::new(bridge);
        identity.push("jwt-a");
        backend.failing_sets.store(1, Ordering::SeqCst);
        let release_clear = backend.gate_next_clear();

        let attempt = tokio::spawn({
            let bridge = Arc::clone(&bridge);
            async move { bridge.on_identity_change(Some("user_a".into())).await }
        });
        wait_for(|| backend.clear_calls.load(Ordering::SeqCst) == 1).await;

        match bridge.state() {
            BridgeState::BridgeFailed { attempt, user_id, reason } => {
                assert_eq!(attempt, 1);
                assert_eq!(user_id, "user_a");
                assert!(reason.contains("rejected"), "reason: {reason}");
            }
            other => panic!("expected bridge_failed during retry, got {other:?}"),
        }

        release_clear.send(()).unwrap();
        let state = attempt.await.unwrap().unwrap();
        assert!(matches!(state, BridgeState::Bridged { attempt: 1, .. }));
        assert_eq!(bridge.state(), state);
    }

    #[tokio::test]
    async fn install_overtaken_mid_flight_reports_superseded() {
        let (identity, backend, bridge) = bridge();
        let bridge = Arc::new(bridge);
        identity.push("jwt-a");
        identity.push("jwt-b");
        let release_set = backend.gate_next_set();

        let attempt_a = tokio::spawn({
            let bridge = Arc::clone(&bridge);
            async move { bridge.on_identity_change(Some("user_a".into())).await }
        });
        wait_for(|| backend.set_calls.load(Ordering::SeqCst) == 1).await;

        let attempt_b = tokio::spawn({
            let bridge = Arc::clone(&bridge);
            async move { bridge.on_identity_change(Some("user_b".into())).await }
        });
        wait_for(|| bridge.attempts_issued() == 2).await;
        release_set.send(()).unwrap();

        assert!(matches!(
            attempt_a.await.unwrap(),
            Err(BridgeError::Superseded { attempt: 1, latest: 2 })
        ));
        assert!(matches!(
            attempt_b.await.unwrap(),
            Ok(BridgeState::Bridged { attempt: 2, .. })
        ));
        assert_eq!(backend.token().as_deref(), Some("jwt-b"));
        assert_eq!(bridge.state(), BridgeState::Bridged { attempt: 2, user_id: "user_b".into() });
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
}
