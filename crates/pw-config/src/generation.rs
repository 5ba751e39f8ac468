//! Generation API (OpenAI-compatible chat completions) configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a social media post generator. \
Create exactly {count} unique variations of posts. \
Number each variation clearly with '1.', '2.', and so on at the start. \
Each post should be separated by a clear delimiter like '---'. \
Focus on readability and proper spacing.";

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

const fn default_temperature() -> f32 {
    0.9
}

const fn default_max_tokens() -> u32 {
    2500
}

const fn default_variation_count() -> u8 {
    3
}

fn default_platform() -> String {
    "LinkedIn".to_string()
}

fn default_system_instruction() -> String {
    DEFAULT_SYSTEM_INSTRUCTION.to_string()
}

const fn default_plain_text() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// API key. The key stored with `pwt config set-api-key` takes precedence.
    #[serde(default)]
    pub api_key: String,

    /// Chat completions endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Number of variations requested per prompt.
    #[serde(default = "default_variation_count")]
    pub variation_count: u8,

    /// Target platform named in the user instruction.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// System instruction template; `{count}` is replaced with the variation count.
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,

    /// Strip `*`, `#` and backticks from generated variations.
    #[serde(default = "default_plain_text")]
    pub plain_text: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            variation_count: default_variation_count(),
            platform: default_platform(),
            system_instruction: default_system_instruction(),
            plain_text: default_plain_text(),
        }
    }
}

impl GenerationConfig {
    /// Check if an API key is present in configuration.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Reject values the completion API would refuse anyway.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.variation_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation.variation_count".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "generation.temperature".into(),
                reason: format!("{} is outside 0.0..=2.0", self.temperature),
            });
        }
        if self.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "generation.endpoint".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
