//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

fn default_data_dir() -> String {
    ".postwright".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Directory holding the local database, relative to the project root.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            data_dir: default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.data_dir, ".postwright");
    }
}
