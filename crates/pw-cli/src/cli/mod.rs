use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `pwt` binary.
#[derive(Debug, Parser)]
#[command(name = "pwt", version, about = "Postwright - generate and track social media posts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root holding `.postwright/` (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::subcommands::{AuthCommands, ConfigCommands, PostCommands, TagCommands};
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "pwt", "--format", "table", "--limit", "10", "--verbose", "stats",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["pwt", "stats", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["pwt", "--format", "xml", "stats"]).is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["pwt", "--project", "/tmp/demo", "stats"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
    }

    #[test]
    fn generate_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "pwt", "generate", "remote work", "--count", "4", "--save", "1", "--save", "3",
            "--tag", "linkedin", "--tag", "tag-1a2b3c4d",
        ])
        .expect("cli should parse");

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.prompt, "remote work");
        assert_eq!(args.count, Some(4));
        assert_eq!(args.save, vec![1, 3]);
        assert!(!args.save_all);
        assert_eq!(args.tag, vec!["linkedin", "tag-1a2b3c4d"]);
    }

    #[test]
    fn generate_save_all_conflicts_with_save() {
        let parsed = Cli::try_parse_from(["pwt", "generate", "x", "--save", "1", "--save-all"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn generate_rejects_zero_count() {
        assert!(Cli::try_parse_from(["pwt", "generate", "x", "--count", "0"]).is_err());
    }

    #[test]
    fn auth_login_user_id_requires_api_key() {
        assert!(Cli::try_parse_from(["pwt", "auth", "login", "--user-id", "user_1"]).is_err());

        let cli = Cli::try_parse_from(["pwt", "auth", "login", "--api-key", "--user-id", "user_1"])
            .expect("cli should parse");
        let Commands::Auth { action: AuthCommands::Login(args) } = cli.command else {
            panic!("expected auth login");
        };
        assert!(args.api_key);
        assert_eq!(args.user_id.as_deref(), Some("user_1"));
    }

    #[test]
    fn nested_subcommands_parse() {
        let cli = Cli::try_parse_from(["pwt", "posts", "get", "pst-00ff00ff"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Posts { action: PostCommands::Get { ref id } } if id == "pst-00ff00ff"
        ));

        let cli = Cli::try_parse_from(["pwt", "tags", "create", "Launch", "--color", "green"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tags { action: TagCommands::Create { ref color, .. } } if color.as_deref() == Some("green")
        ));

        let cli = Cli::try_parse_from(["pwt", "config", "set-api-key", "sk-test"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config { action: ConfigCommands::SetApiKey { ref key } } if key == "sk-test"
        ));
    }
}
