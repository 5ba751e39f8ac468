use pw_auth::SecretSlot;
use pw_generate::CredentialSource;

/// Generation API key from the OS keychain slot written by
/// `pwt config set-api-key`, falling back to `generation.api_key`.
///
/// Read on every call so a key stored mid-session is picked up.
pub struct KeychainCredential {
    slot: Option<SecretSlot>,
    fallback: Option<String>,
}

impl KeychainCredential {
    #[must_use]
    pub fn new(configured: &str) -> Self {
        Self {
            slot: Some(SecretSlot::GENERATION_API_KEY),
            fallback: Some(configured.trim().to_string()).filter(|key| !key.is_empty()),
        }
    }

    #[cfg(test)]
    fn config_only(configured: &str) -> Self {
        Self {
            slot: None,
            ..Self::new(configured)
        }
    }
}

impl CredentialSource for KeychainCredential {
    fn api_key(&self) -> Option<String> {
        self.slot
            .as_ref()
            .and_then(SecretSlot::load)
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_configured_key() {
        assert_eq!(
            KeychainCredential::config_only(" sk-config ").api_key().as_deref(),
            Some("sk-config")
        );
    }

    #[test]
    fn blank_configured_key_is_none() {
        assert_eq!(KeychainCredential::config_only("   ").api_key(), None);
    }
}
