//! Turso transient error retry logic.
//!
//! Turso cloud nodes being created or recycled answer with 400-level Hrana
//! errors that clear up within seconds. Only synced replicas go through this
//! path; local databases never see these errors.

use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior on transient Turso errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Detect transient Turso infrastructure errors.
///
/// Kept narrow so genuine SQL or constraint errors are never retried.
pub fn is_transient_turso_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("unable to acquire shared lock") || msg.contains("deletion must be in progress")
}

/// Run `op`, retrying transient Turso errors with exponential backoff.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, libsql::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, libsql::Error>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if attempt < config.max_attempts && is_transient_turso_error(&e) => {
                tracing::debug!(attempt, ?delay, error = %e, "transient Turso error; retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
                attempt += 1;
            }
            result => return result,
        }
    }
}
