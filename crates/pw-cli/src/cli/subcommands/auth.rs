use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in via browser (or --api-key for CI).
    Login(AuthLoginArgs),
    /// Clear stored credentials.
    Logout,
    /// Show current auth status.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    /// Use the Clerk secret key for CI/headless auth instead of the browser.
    #[arg(long)]
    pub api_key: bool,
    /// Clerk user ID (required with --api-key).
    #[arg(long, requires = "api_key")]
    pub user_id: Option<String>,
}
