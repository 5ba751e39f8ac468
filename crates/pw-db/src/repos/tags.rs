//! Tag repository. Tags are shared by all users.

use pw_core::Tag;
use pw_core::ids::PREFIX_TAG;

use crate::PwDb;
use crate::error::DatabaseError;
use crate::service::PwService;

fn row_to_tag(row: &libsql::Row) -> Result<Tag, DatabaseError> {
    Ok(Tag {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        color: row.get::<String>(2)?,
    })
}

impl PwService {
    /// All tags, built-in ones first, then in creation order.
    pub async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError> {
        self.require_user().await?;
        let db = self.db().await;
        let mut rows = db
            .query("SELECT id, name, color FROM tags ORDER BY rowid", ())
            .await?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next().await? {
            tags.push(row_to_tag(&row)?);
        }
        Ok(tags)
    }

    /// Create a tag. Without a colour, the next palette colour is used.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an empty name or a name
    /// already taken (case-insensitive).
    pub async fn create_tag(&self, name: &str, color: Option<&str>) -> Result<Tag, DatabaseError> {
        self.require_user().await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DatabaseError::InvalidState("tag name is empty".into()));
        }

        let db = self.db().await;
        let mut existing = db
            .query("SELECT id FROM tags WHERE name = ?1 COLLATE NOCASE", [name])
            .await?;
        if existing.next().await?.is_some() {
            return Err(DatabaseError::InvalidState(format!("tag '{name}' already exists")));
        }

        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(color) => color.to_string(),
            None => {
                let mut rows = db.query("SELECT COUNT(*) FROM tags", ()).await?;
                let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
                let count: usize = crate::helpers::get_count(&row, 0)?;
                Tag::PALETTE[count % Tag::PALETTE.len()].to_string()
            }
        };

        let id = db.generate_id(PREFIX_TAG).await?;
        db.execute_with(
            "INSERT INTO tags (id, name, color) VALUES (?1, ?2, ?3)",
            || libsql::params![id.as_str(), name, color.as_str()],
        )
        .await?;

        tracing::debug!(%id, name, "created tag");
        Ok(Tag {
            id,
            name: name.to_string(),
            color,
        })
    }
}

/// Fail with `InvalidState` naming the first tag id that does not exist.
pub(crate) async fn ensure_tags_exist(db: &PwDb, tag_ids: &[String]) -> Result<(), DatabaseError> {
    for tag_id in tag_ids {
        let mut rows = db.query("SELECT 1 FROM tags WHERE id = ?1", [tag_id.as_str()]).await?;
        if rows.next().await?.is_none() {
            return Err(DatabaseError::InvalidState(format!("unknown tag '{tag_id}'")));
        }
    }
    Ok(())
}
