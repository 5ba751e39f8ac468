use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A saved post. Created from a chosen variation, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub prompt: String,
    pub word_count: u32,
    pub created_at: DateTime<Utc>,
    /// Tag IDs attached at save time.
    pub tags: Vec<String>,
}

/// Input for saving a post. The owner comes from the backend session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub prompt: String,
    pub tags: Vec<String>,
}

impl NewPost {
    #[must_use]
    pub fn new(content: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt: prompt.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Reject posts with nothing but whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for empty content.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.content.trim().is_empty() {
            return Err(CoreError::Validation("post content is empty".into()));
        }
        Ok(())
    }

    /// Word count recorded against usage stats when this post is saved.
    #[must_use]
    pub fn word_count(&self) -> u32 {
        count_words(&self.content)
    }
}

/// Count whitespace-separated words.
#[must_use]
pub fn count_words(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_words_ignores_repeated_whitespace() {
        assert_eq!(count_words("  Ship it.\n\nThen   iterate  "), 3);
    }

    #[test]
    fn count_words_empty_is_zero() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words(" \n\t "), 0);
    }

    #[test]
    fn blank_content_fails_validation() {
        assert!(NewPost::new("hello", "p").validate().is_ok());
        let err = NewPost::new(" \n\t", "p").validate().unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn new_post_builder_sets_tags() {
        let post = NewPost::new("Hello world", "greeting").with_tags(vec!["linkedin".into()]);
        assert_eq!(post.tags, vec!["linkedin".to_string()]);
        assert_eq!(post.word_count(), 2);
    }
}
