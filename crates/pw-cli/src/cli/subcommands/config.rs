use clap::Subcommand;

/// Settings commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ConfigCommands {
    /// Store the generation API key in the OS keychain.
    SetApiKey {
        /// The API key.
        key: String,
    },
    /// Remove the stored generation API key.
    ClearApiKey,
    /// Print the effective configuration with secrets masked.
    Show,
}
