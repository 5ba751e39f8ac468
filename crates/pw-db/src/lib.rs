//! # pw-db
//!
//! libSQL persistence for Postwright.
//!
//! Stores posts, tags, and per-user usage stats. Runs against a local file, or
//! against a Turso Cloud embedded replica authenticated with the identity
//! provider's JWT. All store operations go through [`service::PwService`],
//! which owns the backend session slot.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;
use retry::RetryConfig;

/// Database handle: a libSQL database and its connection.
pub struct PwDb {
    db: libsql::Database,
    conn: libsql::Connection,
    synced: bool,
    retry: RetryConfig,
}

impl PwDb {
    /// Open a local-only database at the given path (no cloud sync).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let pw_db = Self {
            db,
            conn,
            synced: false,
            retry: RetryConfig::default(),
        };
        pw_db.run_migrations().await?;
        Ok(pw_db)
    }

    /// Open a Turso Cloud embedded replica at `local_path`, authenticated with
    /// `auth_token`, and pull remote state before running migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the replica cannot be built, the initial sync
    /// fails after retries, or migrations fail.
    pub async fn open_synced(
        local_path: &str,
        remote_url: &str,
        auth_token: &str,
        read_your_writes: bool,
    ) -> Result<Self, DatabaseError> {
        if let Some(parent) = std::path::Path::new(local_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::InvalidState(format!("mkdir {}: {e}", parent.display()))
            })?;
        }

        let db = Builder::new_remote_replica(local_path, remote_url.to_string(), auth_token.to_string())
            .read_your_writes(read_your_writes)
            .build()
            .await?;
        let conn = db.connect()?;
        let pw_db = Self {
            db,
            conn,
            synced: true,
            retry: RetryConfig::default(),
        };
        pw_db.sync().await?;
        pw_db.run_migrations().await?;
        tracing::debug!(remote_url, local_path, "opened synced replica");
        Ok(pw_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_synced_replica(&self) -> bool {
        self.synced
    }

    /// Pull remote state into the replica. No-op for local databases.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if sync fails after retries.
    pub async fn sync(&self) -> Result<(), DatabaseError> {
        if !self.synced {
            return Ok(());
        }
        retry::with_retry(&self.retry, || self.db.sync()).await?;
        Ok(())
    }

    /// Run a single write statement, retrying transient Turso errors on
    /// synced replicas. `params` is called once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the statement fails.
    pub async fn execute_with<F, P>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        if !self.synced {
            return Ok(self.conn.execute(sql, params()).await?);
        }
        Ok(retry::with_retry(&self.retry, || self.conn.execute(sql, params())).await?)
    }

    /// Run a query on the connection.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the query fails.
    pub async fn query(&self, sql: &str, params: impl IntoParams) -> Result<libsql::Rows, DatabaseError> {
        Ok(self.conn.query(sql, params).await?)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"pst-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT ?1 || '-' || lower(hex(randomblob(4)))", [prefix])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}
