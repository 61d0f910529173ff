//! Keeper runtime lifecycle.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{info, warn};

use super::startup::verify_node;
use crate::application::{Keeper, KeeperSettings, SchedulerSettings};
use crate::error::{Error, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::{ChainGateway, Clock, OrderEventStream};

/// Keeper settings derived from configuration.
#[must_use]
pub fn keeper_settings(config: &Config) -> KeeperSettings {
    KeeperSettings {
        scheduler: SchedulerSettings {
            tick_interval: config.keeper.tick_interval(),
            max_gas_price_wei: config.keeper.max_gas_price_wei(),
            dry_run: config.dry_run,
        },
        resubscribe_delay: config.keeper.resubscribe_delay(),
    }
}

/// Check the node, then run the keeper over the given ports until
/// `shutdown` flips to `true`.
///
/// # Errors
///
/// Fails if the startup check fails, or if the keeper cannot seed.
pub async fn run_keeper(
    gateway: Arc<dyn ChainGateway>,
    stream: Box<dyn OrderEventStream>,
    clock: Arc<dyn Clock>,
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    verify_node(
        gateway.as_ref(),
        clock.as_ref(),
        config.chain.chain_id,
        config.keeper.stale_block_warn(),
    )
    .await?;

    let settings = keeper_settings(config);
    info!(
        tick_interval_secs = settings.scheduler.tick_interval.as_secs(),
        max_gas_price_wei = ?settings.scheduler.max_gas_price_wei,
        dry_run = settings.scheduler.dry_run,
        "Keeper configured"
    );
    if settings.scheduler.dry_run {
        warn!("Dry-run mode enabled, slices will be logged but not sent");
    }

    Keeper::new(gateway, stream, clock, settings)
        .run(shutdown)
        .await
}

/// Build the EVM adapters from `config` and run with an external shutdown
/// signal.
///
/// # Errors
///
/// Configuration, connection and seeding failures are returned.
#[cfg(feature = "evm")]
pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    use crate::infrastructure::factory::{build_chain, ChainComponents};
    use crate::port::SystemClock;

    let endpoint = config.chain.rpc_endpoint()?;
    info!(
        rpc_host = endpoint.host_str().unwrap_or_default(),
        contract = %config.chain.contract_address,
        dry_run = config.dry_run,
        "Starting twap-keeper"
    );

    let ChainComponents { gateway, stream } = build_chain(&config).await?;
    run_keeper(gateway, stream, Arc::new(SystemClock), &config, shutdown).await
}

/// Run until Ctrl-C, then let the current tick finish.
///
/// # Errors
///
/// See [`run_with_shutdown`].
#[cfg(feature = "evm")]
pub async fn run(config: Config) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut keeper = tokio::spawn(run_with_shutdown(config, shutdown_rx));

    tokio::select! {
        finished = &mut keeper => return flatten(finished),
        signal = signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
            }
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    }

    flatten(keeper.await)
}

fn flatten(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    joined.map_err(|e| Error::Task(format!("keeper: {e}")))?
}
