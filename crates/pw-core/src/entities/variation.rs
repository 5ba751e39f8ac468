use serde::{Deserialize, Serialize};

/// One generated candidate post, in model order (`index` starts at 1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostVariation {
    pub index: usize,
    pub content: String,
}

impl std::fmt::Display for PostVariation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Variation {}: {}", self.index, self.content)
    }
}
