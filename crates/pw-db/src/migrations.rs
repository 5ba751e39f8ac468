//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements are idempotent.

use crate::PwDb;
use crate::error::DatabaseError;

/// Initial schema: posts, tags (seeded), post tags, usage stats and history.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl PwDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
