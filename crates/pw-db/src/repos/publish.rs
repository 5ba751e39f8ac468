//! Publish workflow: save a post, then count it in the usage stats.

use pw_core::{NewPost, Post, UsageStats};

use crate::error::DatabaseError;
use crate::service::PwService;

impl PwService {
    /// Save `post` and record it against the session user's stats.
    ///
    /// Stats are only touched after the save succeeded. The post is counted on
    /// its own creation day.
    ///
    /// # Errors
    ///
    /// Any save error is returned as is, with stats untouched. A stats error
    /// after a successful save is returned too; the post stays saved.
    pub async fn publish(&self, post: NewPost) -> Result<(Post, UsageStats), DatabaseError> {
        let saved = self.save_post(post).await?;
        let stats = self
            .record_usage_on(saved.word_count, saved.created_at.date_naive())
            .await
            .inspect_err(|error| {
                tracing::warn!(post_id = %saved.id, %error, "post saved but usage stats not updated");
            })?;
        Ok((saved, stats))
    }
}
