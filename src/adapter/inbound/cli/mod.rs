//! CLI module graph and command dispatch.

pub mod check;
pub mod command;
pub mod order;
pub mod output;
pub mod paths;
pub mod run;
pub mod scan;

use crate::error::Result;
use crate::infrastructure::config::logging::LoggingConfig;
use command::{CheckCommand, Cli, Commands};

/// Route a parsed command line to its handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Check(CheckCommand::Config(args)) => {
            init_diagnostic_logging(cli.verbose);
            check::execute_config(&args.config)
        }
        Commands::Check(CheckCommand::Connection(args)) => {
            init_diagnostic_logging(cli.verbose);
            check::execute_connection(&args.config).await
        }
        Commands::Order(args) => {
            init_diagnostic_logging(cli.verbose);
            order::execute(args.id, &args.config).await
        }
        Commands::Scan(args) => {
            init_diagnostic_logging(cli.verbose);
            scan::execute(&args.config).await
        }
    }
}

/// Logging for one-shot commands: quiet by default, louder with `-v`.
fn init_diagnostic_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    LoggingConfig {
        level: level.to_string(),
        format: "pretty".to_string(),
    }
    .init();
}
