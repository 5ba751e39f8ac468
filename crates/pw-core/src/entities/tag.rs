use serde::{Deserialize, Serialize};

/// A label that can be attached to saved posts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Tag {
    /// Colours handed out to tags created without an explicit colour.
    pub const PALETTE: &'static [&'static str] = &["blue", "green", "red", "purple", "pink"];
}
