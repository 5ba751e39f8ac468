/// Upper bound on rows fetched by list commands.
pub const MAX_LIMIT: u32 = 500;

/// Compute effective limit: `--limit` if given, otherwise the configured
/// default, capped at [`MAX_LIMIT`].
#[must_use]
pub fn effective_limit(flag: Option<u32>, configured: u32) -> u32 {
    flag.unwrap_or(configured).min(MAX_LIMIT)
}
