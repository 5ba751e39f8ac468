//! Clerk identity provider configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClerkConfig {
    /// Clerk publishable key.
    #[serde(default)]
    pub publishable_key: String,

    /// Clerk secret key (Backend API access, JWKS lookup).
    #[serde(default)]
    pub secret_key: String,

    /// JWKS URL for token verification.
    #[serde(default)]
    pub jwks_url: String,

    /// Frontend app URL (hosted sign-in pages).
    #[serde(default)]
    pub frontend_url: String,

    /// JWT template used when minting fresh session tokens.
    /// Empty means the default session token.
    #[serde(default)]
    pub token_template: String,
}

impl ClerkConfig {
    /// Check if the Clerk config has the minimum required fields.
    pub fn is_configured(&self) -> bool {
        !self.publishable_key.is_empty() && !self.secret_key.is_empty()
    }

    /// The JWT template name, if one is configured.
    pub fn template(&self) -> Option<&str> {
        Some(self.token_template.as_str()).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = ClerkConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.template(), None);
    }

    #[test]
    fn configured_when_keys_set() {
        let config = ClerkConfig {
            publishable_key: "pk_test_123".into(),
            secret_key: "sk_test_456".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }

    #[test]
    fn not_configured_when_missing_secret() {
        let config = ClerkConfig {
            publishable_key: "pk_test_123".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn template_returned_when_set() {
        let config = ClerkConfig {
            token_template: "turso".into(),
            ..Default::default()
        };
        assert_eq!(config.template(), Some("turso"));
    }
}
