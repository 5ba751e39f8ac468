use clap::{Args, Subcommand};

use crate::cli::subcommands::{AuthCommands, ConfigCommands, PostCommands, TagCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Generate post variations for a prompt, optionally saving some.
    Generate(GenerateArgs),
    /// Saved posts.
    Posts {
        #[command(subcommand)]
        action: PostCommands,
    },
    /// Tags.
    Tags {
        #[command(subcommand)]
        action: TagCommands,
    },
    /// Usage statistics: totals, streak, daily history.
    Stats,
    /// Authentication.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Local settings and the stored generation API key.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Arguments for `pwt generate`.
#[derive(Clone, Debug, Args)]
pub struct GenerateArgs {
    /// Topic of the post.
    pub prompt: String,
    /// Number of variations to request (defaults to `generation.variation_count`).
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..))]
    pub count: Option<u8>,
    /// Save the variation with this 1-based index. Repeatable.
    #[arg(long, conflicts_with = "save_all")]
    pub save: Vec<usize>,
    /// Save every returned variation.
    #[arg(long)]
    pub save_all: bool,
    /// Tag id to attach to saved posts. Repeatable.
    #[arg(short, long)]
    pub tag: Vec<String>,
}
