//! Usage stats: per-user totals, streak, and daily history.

use chrono::{NaiveDate, Utc};
use pw_core::{DailyCount, UsageStats, next_streak};

use crate::error::DatabaseError;
use crate::helpers::{get_count, get_opt_string, parse_day, to_sql_count};
use crate::service::PwService;

async fn load_stats(
    conn: &libsql::Connection,
    user_id: &str,
) -> Result<UsageStats, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT total_posts, total_words, current_streak, last_post_date
             FROM usage_stats WHERE user_id = ?1",
            [user_id],
        )
        .await?;
    let Some(row) = rows.next().await? else {
        return Ok(UsageStats::default());
    };
    let mut stats = UsageStats {
        total_posts: get_count(&row, 0)?,
        total_words: get_count(&row, 1)?,
        current_streak: get_count(&row, 2)?,
        last_post_date: get_opt_string(&row, 3)?
            .map(|d| parse_day(&d))
            .transpose()?,
        history: Vec::new(),
    };

    let mut rows = conn
        .query(
            "SELECT day, posts, words FROM usage_history WHERE user_id = ?1 ORDER BY day",
            [user_id],
        )
        .await?;
    while let Some(row) = rows.next().await? {
        stats.history.push(DailyCount {
            day: parse_day(&row.get::<String>(0)?)?,
            posts: get_count(&row, 1)?,
            words: get_count(&row, 2)?,
        });
    }
    Ok(stats)
}

impl PwService {
    /// Record one saved post of `word_count` words today (UTC).
    pub async fn record_usage(&self, word_count: u32) -> Result<UsageStats, DatabaseError> {
        self.record_usage_on(word_count, Utc::now().date_naive()).await
    }

    /// Record one saved post of `word_count` words on `day`.
    ///
    /// Totals, streak, and the day's history entry are updated together.
    pub async fn record_usage_on(
        &self,
        word_count: u32,
        day: NaiveDate,
    ) -> Result<UsageStats, DatabaseError> {
        let user_id = self.require_user().await?;
        let db = self.db().await;
        let tx = db.conn().transaction().await?;
        let previous = load_stats(&tx, &user_id).await?;

        let streak = next_streak(previous.last_post_date, day, previous.current_streak);
        let last_post_date = previous.last_post_date.map_or(day, |prev| prev.max(day));
        let total_posts = to_sql_count(previous.total_posts.saturating_add(1))?;
        let total_words = to_sql_count(previous.total_words.saturating_add(u64::from(word_count)))?;

        tx.execute(
            "INSERT INTO usage_stats (user_id, total_posts, total_words, current_streak, last_post_date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                total_posts = excluded.total_posts,
                total_words = excluded.total_words,
                current_streak = excluded.current_streak,
                last_post_date = excluded.last_post_date",
            libsql::params![
                user_id.as_str(),
                total_posts,
                total_words,
                i64::from(streak),
                last_post_date.to_string()
            ],
        )
        .await?;
        tx.execute(
            "INSERT INTO usage_history (user_id, day, posts, words) VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(user_id, day) DO UPDATE SET
                posts = posts + 1,
                words = words + excluded.words",
            libsql::params![user_id.as_str(), day.to_string(), i64::from(word_count)],
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(%user_id, %day, word_count, streak, "recorded usage");
        load_stats(db.conn(), &user_id).await
    }

    /// Usage stats of the session user; zeroed if nothing was recorded yet.
    pub async fn read_stats(&self) -> Result<UsageStats, DatabaseError> {
        let user_id = self.require_user().await?;
        let db = self.db().await;
        load_stats(db.conn(), &user_id).await
    }
}
