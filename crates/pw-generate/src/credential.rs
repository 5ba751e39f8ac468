use std::sync::RwLock;

/// Supplies the generation API key at call time.
pub trait CredentialSource: Send + Sync {
    /// The key, or `None` when not configured. Empty strings count as `None`
    /// for callers.
    fn api_key(&self) -> Option<String>;
}

/// In-memory key, replaceable at runtime.
#[derive(Debug, Default)]
pub struct StaticCredential {
    key: RwLock<Option<String>>,
}

impl StaticCredential {
    #[must_use]
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: RwLock::new(key),
        }
    }

    pub fn set(&self, key: Option<String>) {
        let mut slot = self
            .key
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = key;
    }
}

impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<String> {
        self.key
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}
