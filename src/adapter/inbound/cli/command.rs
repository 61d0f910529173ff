//! Command-line interface definitions.
//!
//! Defines the CLI structure for the keeper using `clap`: `run` starts the
//! keeper, the remaining subcommands are read-only inspections of the order
//! contract and the local configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Off-chain keeper for time-sliced TWAP orders
#[derive(Parser, Debug)]
#[command(name = "twap-keeper")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the keeper until interrupted
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Show the on-chain state of one order
    Order(OrderArgs),

    /// List the orders the keeper would track if started now
    Scan(ConfigPathArg),
}

/// Subcommands for `twap-keeper check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file.
    Config(ConfigPathArg),
    /// Query the node: chain id, head block and its age.
    Connection(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
///
/// Optional fields override the corresponding configuration file values.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Evaluate orders and log due slices without sending transactions.
    #[arg(long)]
    pub dry_run: bool,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,

    /// Override the scheduler tick interval in seconds.
    #[arg(long, value_name = "SECS")]
    pub tick_interval: Option<u64>,
}

/// Arguments for the `order` subcommand.
#[derive(Parser, Debug)]
pub struct OrderArgs {
    /// Order id.
    pub id: u64,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn has_name_and_version() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "twap-keeper");
        assert!(cmd.get_version().is_some());
    }

    #[test]
    fn parses_run_with_defaults() {
        let cli = Cli::try_parse_from(["twap-keeper", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(!args.dry_run);
        assert!(!args.json_logs);
        assert!(args.log_level.is_none());
        assert!(args.tick_interval.is_none());
        assert_eq!(args.config, paths::default_config());
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "twap-keeper",
            "run",
            "--config",
            "/tmp/keeper.toml",
            "--dry-run",
            "--log-level",
            "debug",
            "--json-logs",
            "--tick-interval",
            "3",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("/tmp/keeper.toml"));
        assert!(args.dry_run);
        assert!(args.json_logs);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.tick_interval, Some(3));
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["twap-keeper", "scan", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Scan(_)));
    }

    #[test]
    fn parses_check_subcommands() {
        let cli = Cli::try_parse_from(["twap-keeper", "check", "config", "-c", "k.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Check(CheckCommand::Config(ConfigPathArg { ref config }))
                if config == &PathBuf::from("k.toml")
        ));

        let cli = Cli::try_parse_from(["twap-keeper", "check", "connection"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Check(CheckCommand::Connection(_))
        ));
    }

    #[test]
    fn order_requires_numeric_id() {
        let cli = Cli::try_parse_from(["twap-keeper", "order", "17"]).unwrap();
        assert!(matches!(cli.command, Commands::Order(OrderArgs { id: 17, .. })));

        assert!(Cli::try_parse_from(["twap-keeper", "order"]).is_err());
        assert!(Cli::try_parse_from(["twap-keeper", "order", "abc"]).is_err());
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["twap-keeper", "trade"]).is_err());
    }
}
