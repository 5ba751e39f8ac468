//! # pw-config
//!
//! Layered configuration loading for Postwright using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`POSTWRIGHT_*` prefix, `__` as separator)
//! 2. Project-level `.postwright/config.toml`
//! 3. User-level `~/.config/postwright/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `POSTWRIGHT_CLERK__SECRET_KEY` -> `clerk.secret_key`,
//! `POSTWRIGHT_GENERATION__VARIATION_COUNT` -> `generation.variation_count`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use pw_config::PwConfig;
//!
//! let config = PwConfig::load_with_dotenv().expect("config");
//! if config.clerk.is_configured() {
//!     println!("Clerk sign-in enabled");
//! }
//! ```

mod clerk;
mod error;
mod general;
mod generation;
mod turso;

pub use clerk::ClerkConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use generation::GenerationConfig;
pub use turso::TursoConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PwConfig {
    #[serde(default)]
    pub clerk: ClerkConfig,
    #[serde(default)]
    pub turso: TursoConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl PwConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`. Use [`Self::load_with_dotenv`] for `.env` loading.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.generation.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".postwright/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("POSTWRIGHT_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("postwright").join("config.toml"))
    }
}
