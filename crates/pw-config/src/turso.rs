//! Turso/libSQL backend configuration.
//!
//! When a URL is set, the backend session installed by the session bridge
//! authenticates an embedded replica with the identity provider's JWT
//! (Turso validates it against the Clerk JWKS).

use serde::{Deserialize, Serialize};

/// Default read-your-writes setting.
const fn default_read_your_writes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TursoConfig {
    /// Database URL (e.g., `libsql://posts-myorg.turso.io`).
    #[serde(default)]
    pub url: String,

    /// Local replica path. Empty means `<data_dir>/postwright-synced.db`.
    #[serde(default)]
    pub local_replica_path: String,

    /// Whether to use read-your-writes consistency.
    #[serde(default = "default_read_your_writes")]
    pub read_your_writes: bool,
}

impl Default for TursoConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            local_replica_path: String::new(),
            read_your_writes: default_read_your_writes(),
        }
    }
}

impl TursoConfig {
    /// Check if a remote database is configured.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    /// Check if an explicit replica path was given.
    pub fn has_local_replica(&self) -> bool {
        !self.local_replica_path.is_empty()
    }
}
