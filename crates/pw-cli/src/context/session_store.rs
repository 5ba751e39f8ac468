use std::sync::Arc;

use async_trait::async_trait;
use pw_auth::{AuthError, BackendSessionStore};
use pw_core::BackendSession;
use pw_db::service::PwService;

/// The database service as the bridge's backend session store.
pub struct ServiceSessionStore(pub Arc<PwService>);

#[async_trait]
impl BackendSessionStore for ServiceSessionStore {
    async fn set_session(&self, session: &BackendSession) -> Result<(), AuthError> {
        self.0
            .install_session(session.clone())
            .await
            .map_err(|e| AuthError::BackendSession(e.to_string()))
    }

    async fn clear_session(&self) -> Result<(), AuthError> {
        self.0
            .clear_session()
            .await
            .map_err(|e| AuthError::BackendSession(e.to_string()))
    }

    async fn current_session(&self) -> Option<BackendSession> {
        self.0.current_session().await
    }
}
