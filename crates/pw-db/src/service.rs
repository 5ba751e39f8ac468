//! Service layer owning the database handle and the backend session slot.
//!
//! `PwService` wraps `PwDb` and the [`BackendSession`] installed by the
//! session bridge. All repo methods are implemented as `impl PwService` and
//! resolve the acting user through [`PwService::require_user`].

use pw_config::TursoConfig;
use pw_core::BackendSession;
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::PwDb;
use crate::error::DatabaseError;

/// Remote database an installed session authenticates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub url: String,
    pub local_replica_path: String,
    pub read_your_writes: bool,
}

impl RemoteTarget {
    /// `None` when Turso is not configured. An empty replica path resolves to
    /// `<data_dir>/postwright-synced.db`.
    #[must_use]
    pub fn from_config(turso: &TursoConfig, data_dir: &str) -> Option<Self> {
        if !turso.is_configured() {
            return None;
        }
        let local_replica_path = if turso.has_local_replica() {
            turso.local_replica_path.clone()
        } else {
            std::path::Path::new(data_dir)
                .join("postwright-synced.db")
                .to_string_lossy()
                .into_owned()
        };
        Some(Self {
            url: turso.url.clone(),
            local_replica_path,
            read_your_writes: turso.read_your_writes,
        })
    }
}

pub struct PwService {
    db: RwLock<PwDb>,
    session: RwLock<Option<BackendSession>>,
    remote: Option<RemoteTarget>,
}

impl PwService {
    /// Service over a local database file (or `":memory:"`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        Ok(Self::from_db(PwDb::open_local(db_path).await?))
    }

    /// Service whose database is a Turso replica opened per installed session.
    ///
    /// Until a session is installed the handle is an empty in-memory database,
    /// and every store call fails with `NotAuthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the placeholder database cannot be opened.
    pub async fn new_remote(remote: RemoteTarget) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: RwLock::new(PwDb::open_local(":memory:").await?),
            session: RwLock::new(None),
            remote: Some(remote),
        })
    }

    /// Create from an existing `PwDb` (for testing).
    #[must_use]
    pub fn from_db(db: PwDb) -> Self {
        Self {
            db: RwLock::new(db),
            session: RwLock::new(None),
            remote: None,
        }
    }

    /// Access the underlying database handle.
    pub async fn db(&self) -> RwLockReadGuard<'_, PwDb> {
        self.db.read().await
    }

    #[must_use]
    pub const fn remote(&self) -> Option<&RemoteTarget> {
        self.remote.as_ref()
    }

    pub async fn is_synced_replica(&self) -> bool {
        self.db.read().await.is_synced_replica()
    }

    /// Install `session`. With a remote target, the replica connection is
    /// rebuilt using the session's access token first; on failure the
    /// previous session and connection stay in place.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the replica cannot be opened.
    pub async fn install_session(&self, session: BackendSession) -> Result<(), DatabaseError> {
        if let Some(remote) = &self.remote {
            let rebuilt = PwDb::open_synced(
                &remote.local_replica_path,
                &remote.url,
                &session.access_token,
                remote.read_your_writes,
            )
            .await?;
            *self.db.write().await = rebuilt;
        }
        tracing::debug!(user_id = %session.user_id, "backend session installed");
        *self.session.write().await = Some(session);
        Ok(())
    }

    /// Drop the current session. With a remote target the replica connection
    /// is swapped for an empty in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the placeholder database cannot be opened.
    pub async fn clear_session(&self) -> Result<(), DatabaseError> {
        *self.session.write().await = None;
        if self.remote.is_some() {
            *self.db.write().await = PwDb::open_local(":memory:").await?;
        }
        tracing::debug!("backend session cleared");
        Ok(())
    }

    pub async fn current_session(&self) -> Option<BackendSession> {
        self.session.read().await.clone()
    }

    /// User ID bound to the installed session.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotAuthenticated` when no session is installed.
    pub async fn require_user(&self) -> Result<String, DatabaseError> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.user_id.clone())
            .ok_or(DatabaseError::NotAuthenticated)
    }
}
