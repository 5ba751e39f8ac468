use clap::Subcommand;

/// Tag commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TagCommands {
    /// List all tags.
    List,
    /// Create a tag.
    Create {
        /// Display name (unique, case-insensitive).
        name: String,
        /// Colour name; picked from the palette when omitted.
        #[arg(long)]
        color: Option<String>,
    },
}
