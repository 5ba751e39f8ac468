use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::cli::subcommands::AuthCommands;

mod cli;
mod commands;
mod context;
mod output;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("pwt error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    let project_root = resolve_project_root(flags.project.as_deref())?;
    let config = load_config(&project_root)?;
    context::warn_unconfigured(&config);

    // These never touch the data store.
    match &cli.command {
        cli::Commands::Auth {
            action: AuthCommands::Login(args),
        } => {
            return commands::auth::login(args, &flags, &config).await;
        }
        cli::Commands::Config { action } => {
            return commands::config::handle(action, &flags, &config);
        }
        _ => {}
    }

    let ctx = context::AppContext::init(&project_root, config)
        .await
        .context("failed to initialize postwright application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("POSTWRIGHT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

/// `--project` if given, otherwise the current directory.
fn resolve_project_root(project_override: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(path) = project_override {
        let explicit = PathBuf::from(path);
        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == ".postwright")
        {
            return explicit
                .parent()
                .map(std::path::Path::to_path_buf)
                .context("invalid --project path: '.postwright' directory has no parent");
        }
        if explicit.is_dir() {
            return Ok(explicit);
        }
        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }
    std::env::current_dir().context("failed to read current directory")
}

/// Load `<project>/.env` when present, then the layered config.
fn load_config(project_root: &std::path::Path) -> anyhow::Result<pw_config::PwConfig> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return pw_config::PwConfig::load().map_err(anyhow::Error::from);
    }
    pw_config::PwConfig::load_with_dotenv().map_err(anyhow::Error::from)
}
