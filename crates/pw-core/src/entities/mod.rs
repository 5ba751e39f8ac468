//! Entity structs for Postwright domain objects.

mod post;
mod session;
mod stats;
mod tag;
mod variation;

pub use post::{NewPost, Post, count_words};
pub use session::BackendSession;
pub use stats::{DailyCount, UsageStats, next_streak};
pub use tag::Tag;
pub use variation::PostVariation;
