use clap::Subcommand;

/// Saved post commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PostCommands {
    /// List your saved posts, newest first.
    List,
    /// Show one saved post.
    Get {
        /// Post ID (`pst-...`).
        id: String,
    },
}
