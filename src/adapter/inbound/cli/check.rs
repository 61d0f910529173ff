//! Handlers for `check config` and `check connection`.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, PRIVATE_KEY_ENV};
use crate::infrastructure::factory::{build_gateway, build_signer, SignerRequirement};
use crate::infrastructure::orchestration::{block_age, verify_node};
use crate::port::{Clock, SystemClock};

/// Validate the configuration file without connecting.
pub fn execute_config(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let signer = build_signer(&config)?;

    if output::is_json() {
        output::json_output(json!({
            "config": path.display().to_string(),
            "valid": true,
            "contract": config.chain.contract_address,
            "chain_id": config.chain.chain_id,
            "dry_run": config.dry_run,
            "max_gas_price_wei": config.keeper.max_gas_price_wei().map(|wei| wei.to_string()),
            "signer": signer.as_ref().map(|s| s.address().to_string()),
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Contract", &config.chain.contract_address);
    output::field(
        "Chain ID",
        config
            .chain
            .chain_id
            .map_or_else(|| "any".to_string(), |id| id.to_string()),
    );
    output::field("Tick", format!("{}s", config.keeper.tick_interval_secs));
    output::field("Dry run", config.dry_run);

    match signer {
        Some(signer) => output::success(&format!("Signing key detected ({})", signer.address())),
        None => {
            output::warning(&format!("Signing key not configured (set {PRIVATE_KEY_ENV} to run)"));
            output::hint("read-only commands and --dry-run work without a key");
        }
    }

    Ok(())
}

/// Connect to the node and report its state.
pub async fn execute_connection(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    let gateway = build_gateway(&config, SignerRequirement::Optional).await?;
    let clock = SystemClock;

    let status = verify_node(
        &gateway,
        &clock,
        config.chain.chain_id,
        config.keeper.stale_block_warn(),
    )
    .await?;
    let age = block_age(&status, clock.now());
    let stale = age > config.keeper.stale_block_warn_secs;

    if output::is_json() {
        output::json_output(json!({
            "chain_id": status.chain_id,
            "latest_block": status.latest_block,
            "latest_block_timestamp": status.latest_block_timestamp,
            "block_age_secs": age,
            "stale": stale,
        }));
        return Ok(());
    }

    output::section("Connection Check");
    output::field("RPC", &config.chain.rpc_url);
    output::field("Chain ID", status.chain_id);
    output::field("Latest block", status.latest_block);
    output::field("Block time", output::timestamp(status.latest_block_timestamp));
    output::field("Block age", format!("{age}s"));

    if stale {
        output::warning("Latest block is stale, the node may be out of sync");
    } else {
        output::success("Node is reachable and in sync");
    }

    Ok(())
}
