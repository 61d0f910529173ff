//! Handler for the `run` command.

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    apply_overrides(&mut config, args, output::is_json());
    config.validate()?;
    config.init_logging();

    if !output::is_quiet() || output::is_json() {
        print_startup(&config);
    }

    orchestration::run(config).await
}

/// Apply command-line overrides on top of the file values.
fn apply_overrides(config: &mut Config, args: &RunArgs, force_json_logs: bool) {
    if args.dry_run {
        config.dry_run = true;
    }
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    if args.json_logs || force_json_logs {
        config.logging.format = "json".to_string();
    }
    if let Some(secs) = args.tick_interval {
        config.keeper.tick_interval_secs = secs;
    }
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Contract", &config.chain.contract_address);
    if output::verbosity() > 0 {
        output::field("RPC", &config.chain.rpc_url);
    }
    output::field("Tick", format!("{}s", config.keeper.tick_interval_secs));
    match &config.keeper.max_gas_price_gwei {
        Some(ceiling) => output::field("Gas ceiling", format!("{ceiling} gwei")),
        None => output::field("Gas ceiling", "none"),
    }
    output::field(
        "Signer",
        if config.private_key.is_some() {
            "configured"
        } else {
            "missing"
        },
    );

    if config.dry_run {
        output::warning("Dry-run mode enabled, slices will be logged but not sent");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::inbound::cli::command::{Cli, Commands};
    use crate::testkit::config::minimal_toml;
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["twap-keeper", "run"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    fn config() -> Config {
        Config::parse_toml_with_key(minimal_toml(), None).unwrap()
    }

    #[test]
    fn no_flags_keep_file_values() {
        let mut config = config();
        apply_overrides(&mut config, &run_args(&[]), false);

        assert!(!config.dry_run);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.keeper.tick_interval_secs, 10);
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = config();
        let args = run_args(&[
            "--dry-run",
            "--log-level",
            "debug",
            "--json-logs",
            "--tick-interval",
            "2",
        ]);
        apply_overrides(&mut config, &args, false);

        assert!(config.dry_run);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.is_json());
        assert_eq!(config.keeper.tick_interval_secs, 2);
    }

    #[test]
    fn json_output_forces_json_logs() {
        let mut config = config();
        apply_overrides(&mut config, &run_args(&[]), true);
        assert!(config.logging.is_json());
    }

    #[test]
    fn zero_tick_override_fails_validation() {
        let mut config = config();
        apply_overrides(&mut config, &run_args(&["--tick-interval", "0"]), false);
        assert!(config.validate().is_err());
    }
}
