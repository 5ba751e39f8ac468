use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuthError;

const DEFAULT_KEYRING_SERVICE: &str = "postwright-cli";
const CREDENTIALS_DIR: &str = ".postwright";

/// Returns the keyring service name.
///
/// Defaults to `"postwright-cli"`. Override via `POSTWRIGHT_KEYRING_SERVICE`
/// for testing to avoid touching production credentials.
fn keyring_service() -> String {
    std::env::var("POSTWRIGHT_KEYRING_SERVICE")
        .unwrap_or_else(|_| DEFAULT_KEYRING_SERVICE.to_string())
}

/// Which tier a loaded secret came from (for status display).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Keyring,
    Env,
    File,
}

impl SecretSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::Env => "env",
            Self::File => "file",
        }
    }
}

/// A named secret persisted in the OS keychain, with env and file fallbacks.
///
/// Load priority: keyring → env var (if the slot has one) → `~/.postwright/<file>`.
#[derive(Debug, Clone, Copy)]
pub struct SecretSlot {
    keyring_user: &'static str,
    env_var: Option<&'static str>,
    file_name: &'static str,
}

impl SecretSlot {
    /// The Clerk identity JWT.
    pub const IDENTITY_TOKEN: Self = Self {
        keyring_user: "clerk-jwt",
        env_var: Some("POSTWRIGHT_AUTH__TOKEN"),
        file_name: "credentials",
    };

    /// The generation API key. Env override goes through config
    /// (`POSTWRIGHT_GENERATION__API_KEY`), so the slot has no env var of its own.
    pub const GENERATION_API_KEY: Self = Self {
        keyring_user: "generation-api-key",
        env_var: None,
        file_name: "generation_key",
    };

    /// Store a secret in the OS keychain. Falls back to file if keyring unavailable.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if both keyring and file storage fail.
    pub fn store(&self, secret: &str) -> Result<(), AuthError> {
        match keyring::Entry::new(&keyring_service(), self.keyring_user) {
            Ok(entry) => match entry.set_password(secret) {
                Ok(()) => Ok(()),
                Err(error) => {
                    tracing::warn!(%error, slot = self.keyring_user, "keyring store failed; falling back to file");
                    store_file(&self.file_path()?, secret)
                }
            },
            Err(error) => {
                tracing::warn!(%error, slot = self.keyring_user, "keyring unavailable; falling back to file");
                store_file(&self.file_path()?, secret)
            }
        }
    }

    #[must_use]
    pub fn load(&self) -> Option<String> {
        self.load_with_source().map(|(secret, _)| secret)
    }

    /// Detect which tier the current secret came from.
    #[must_use]
    pub fn detect_source(&self) -> Option<SecretSource> {
        self.load_with_source().map(|(_, source)| source)
    }

    fn load_with_source(&self) -> Option<(String, SecretSource)> {
        if let Ok(entry) = keyring::Entry::new(&keyring_service(), self.keyring_user)
            && let Ok(secret) = entry.get_password()
            && !secret.is_empty()
        {
            return Some((secret, SecretSource::Keyring));
        }

        if let Some(var) = self.env_var
            && let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return Some((secret, SecretSource::Env));
        }

        let path = self.file_path().ok()?;
        load_file(&path).map(|secret| (secret, SecretSource::File))
    }

    /// Delete the secret from keyring and file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStoreError` if the file cannot be removed.
    pub fn delete(&self) -> Result<(), AuthError> {
        // May not exist.
        if let Ok(entry) = keyring::Entry::new(&keyring_service(), self.keyring_user) {
            let _ = entry.delete_credential();
        }
        delete_file(&self.file_path()?)
    }

    fn file_path(&self) -> Result<PathBuf, AuthError> {
        dirs::home_dir()
            .map(|h| h.join(CREDENTIALS_DIR).join(self.file_name))
            .ok_or_else(|| {
                AuthError::TokenStoreError("home directory not found — cannot store credentials".into())
            })
    }
}

// --- Private file helpers ---

fn store_file(path: &Path, secret: &str) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AuthError::TokenStoreError(format!("mkdir {}: {e}", parent.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
    }
    fs::write(path, secret)
        .map_err(|e| AuthError::TokenStoreError(format!("write {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| AuthError::TokenStoreError(format!("chmod {}: {e}", path.display())))?;
    }

    Ok(())
}

fn load_file(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn delete_file(path: &Path) -> Result<(), AuthError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            AuthError::TokenStoreError(format!("failed to delete {}: {e}", path.display()))
        })?;
    }
    Ok(())
}
