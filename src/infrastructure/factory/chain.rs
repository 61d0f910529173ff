//! Gateway and event stream construction.

use std::str::FromStr;
use std::sync::Arc;

use alloy_signer_local::PrivateKeySigner;
use tracing::info;

use crate::adapter::outbound::evm::{EvmGateway, EvmOrderStream, SubmissionSettings};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::{Config, PRIVATE_KEY_ENV};
use crate::infrastructure::retry::RetryPolicy;
use crate::infrastructure::subscription::ReconnectingOrderStream;
use crate::port::OrderEventStream;

/// Whether the gateway must be able to sign slice transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerRequirement {
    /// Fail when `KEEPER_PRIVATE_KEY` is unset.
    Required,
    /// Use the key if present, otherwise connect read-only.
    Optional,
}

/// Parse the configured signing key, if any.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the key is not a valid
/// secp256k1 secret.
#[allow(clippy::result_large_err)]
pub fn build_signer(config: &Config) -> Result<Option<PrivateKeySigner>> {
    let Some(raw) = config.private_key.as_deref() else {
        return Ok(None);
    };

    PrivateKeySigner::from_str(raw).map(Some).map_err(|e| {
        ConfigError::InvalidValue {
            field: PRIVATE_KEY_ENV,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Connect the EVM gateway described by `config`.
///
/// # Errors
///
/// Fails on a missing or invalid signing key (when required), an invalid
/// endpoint or contract address, or a transport that cannot be set up.
pub async fn build_gateway(config: &Config, signer: SignerRequirement) -> Result<EvmGateway> {
    let key = build_signer(config)?;
    if key.is_none() && signer == SignerRequirement::Required && !config.dry_run {
        return Err(ConfigError::MissingField {
            field: PRIVATE_KEY_ENV,
        }
        .into());
    }

    let submission = SubmissionSettings {
        gas_limit: config.keeper.gas_limit,
        confirmations: config.keeper.confirmations,
        confirmation_timeout: config.keeper.confirmation_timeout(),
    };

    EvmGateway::connect(
        &config.chain.rpc_endpoint()?,
        config.chain.contract()?,
        key,
        RetryPolicy::from_config(&config.rpc),
        submission,
    )
    .await
}

/// Build the `OrderCreated` feed for `gateway`'s contract, wrapped for
/// automatic resubscription.
pub fn build_event_stream(config: &Config, gateway: &EvmGateway) -> Box<dyn OrderEventStream> {
    let stream = EvmOrderStream::new(
        gateway.provider(),
        gateway.contract_address(),
        config.keeper.event_poll_interval(),
        config.rpc.request_timeout(),
    )
    .with_max_log_range(config.rpc.max_log_range);

    info!(
        poll_interval_secs = config.keeper.event_poll_interval_secs,
        max_log_range = config.rpc.max_log_range,
        "Event stream configured"
    );

    Box::new(ReconnectingOrderStream::new(stream, config.reconnection.clone()))
}

/// Gateway plus event stream, ready to hand to the keeper.
pub struct ChainComponents {
    pub gateway: Arc<EvmGateway>,
    pub stream: Box<dyn OrderEventStream>,
}

/// Build everything the keeper needs from the chain.
///
/// # Errors
///
/// See [`build_gateway`].
pub async fn build_chain(config: &Config) -> Result<ChainComponents> {
    let gateway = build_gateway(config, SignerRequirement::Required).await?;
    let stream = build_event_stream(config, &gateway);
    Ok(ChainComponents {
        gateway: Arc::new(gateway),
        stream,
    })
}
