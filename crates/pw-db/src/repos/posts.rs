//! Saved posts, scoped to the session user.

use chrono::Utc;
use pw_core::ids::PREFIX_POST;
use pw_core::{NewPost, Post, count_words};

use crate::PwDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_count, parse_datetime};
use crate::repos::tags::ensure_tags_exist;
use crate::service::PwService;

const POST_COLUMNS: &str = "id, user_id, content, prompt, word_count, created_at";

fn row_to_post(row: &libsql::Row) -> Result<Post, DatabaseError> {
    Ok(Post {
        id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        content: row.get::<String>(2)?,
        prompt: row.get::<String>(3)?,
        word_count: get_count(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        tags: Vec::new(),
    })
}

async fn load_tags(db: &PwDb, post_id: &str) -> Result<Vec<String>, DatabaseError> {
    let mut rows = db
        .query(
            "SELECT tag_id FROM post_tags WHERE post_id = ?1 ORDER BY position",
            [post_id],
        )
        .await?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next().await? {
        tags.push(row.get::<String>(0)?);
    }
    Ok(tags)
}

impl PwService {
    /// Save a post for the session user.
    ///
    /// Content is trimmed; duplicate tag ids are collapsed, keeping the first.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a session; `InvalidState` for empty content
    /// or an unknown tag id.
    pub async fn save_post(&self, post: NewPost) -> Result<Post, DatabaseError> {
        let user_id = self.require_user().await?;
        post.validate()
            .map_err(|e| DatabaseError::InvalidState(e.to_string()))?;
        let content = post.content.trim();
        let mut tags: Vec<String> = Vec::with_capacity(post.tags.len());
        for tag in post.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let db = self.db().await;
        ensure_tags_exist(&db, &tags).await?;

        let id = db.generate_id(PREFIX_POST).await?;
        let created_at = format_datetime(&Utc::now());
        let word_count = count_words(content);

        let tx = db.conn().transaction().await?;
        tx.execute(
            &format!("INSERT INTO posts ({POST_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            libsql::params![
                id.as_str(),
                user_id.as_str(),
                content,
                post.prompt.as_str(),
                i64::from(word_count),
                created_at.as_str()
            ],
        )
        .await?;
        let mut position: i64 = 0;
        for tag_id in &tags {
            tx.execute(
                "INSERT INTO post_tags (post_id, tag_id, position) VALUES (?1, ?2, ?3)",
                libsql::params![id.as_str(), tag_id.as_str(), position],
            )
            .await?;
            position += 1;
        }
        tx.commit().await?;

        tracing::debug!(%id, %user_id, word_count, "saved post");
        Ok(Post {
            id,
            user_id,
            content: content.to_string(),
            prompt: post.prompt,
            word_count,
            created_at: parse_datetime(&created_at)?,
            tags,
        })
    }

    /// The session user's posts, newest first.
    pub async fn list_posts(&self, limit: u32) -> Result<Vec<Post>, DatabaseError> {
        let user_id = self.require_user().await?;
        let db = self.db().await;
        let mut rows = db
            .query(
                &format!(
                    "SELECT {POST_COLUMNS} FROM posts WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2"
                ),
                libsql::params![user_id.as_str(), i64::from(limit)],
            )
            .await?;

        let mut posts = Vec::new();
        while let Some(row) = rows.next().await? {
            posts.push(row_to_post(&row)?);
        }
        for post in &mut posts {
            post.tags = load_tags(&db, &post.id).await?;
        }
        Ok(posts)
    }

    /// A single post. Posts of other users read as missing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the session user has no such post.
    pub async fn get_post(&self, id: &str) -> Result<Post, DatabaseError> {
        let user_id = self.require_user().await?;
        let db = self.db().await;
        let mut rows = db
            .query(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1 AND user_id = ?2"),
                [id, user_id.as_str()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let mut post = row_to_post(&row)?;
        post.tags = load_tags(&db, &post.id).await?;
        Ok(post)
    }
}
