use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-user usage counters, updated once per saved post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageStats {
    pub total_posts: u64,
    pub total_words: u64,
    pub current_streak: u32,
    pub last_post_date: Option<NaiveDate>,
    /// Daily counts, oldest first.
    pub history: Vec<DailyCount>,
}

/// Posts and words saved on a single calendar day (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub posts: u64,
    pub words: u64,
}

/// Compute the streak after a post saved on `today`.
///
/// ```text
/// no previous post          → 1
/// previous post same day    → unchanged (at least 1)
/// previous post yesterday   → streak + 1
/// previous post ≥ 2 days ago → 1
/// ```
#[must_use]
pub fn next_streak(previous: Option<NaiveDate>, today: NaiveDate, current: u32) -> u32 {
    let Some(previous) = previous else {
        return 1;
    };
    match (today - previous).num_days() {
        // A previous date in the future (clock skew) counts as today.
        days if days <= 0 => current.max(1),
        1 => current.saturating_add(1),
        _ => 1,
    }
}
