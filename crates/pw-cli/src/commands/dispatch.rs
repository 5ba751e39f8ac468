use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::cli::subcommands::AuthCommands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Generate(args) => commands::generate::handle(&args, ctx, flags).await,
        Commands::Posts { action } => commands::posts::handle(&action, ctx, flags).await,
        Commands::Tags { action } => commands::tags::handle(&action, ctx, flags).await,
        Commands::Stats => commands::stats::handle(ctx, flags).await,
        Commands::Auth {
            action: AuthCommands::Status,
        } => commands::auth::status(ctx, flags),
        Commands::Auth {
            action: AuthCommands::Logout,
        } => commands::auth::logout(ctx, flags).await,
        Commands::Auth { .. } | Commands::Config { .. } => {
            unreachable!("auth login and config are pre-dispatched in main")
        }
    }
}
