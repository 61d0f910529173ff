//! [`ChainGateway`] over JSON-RPC.
//!
//! Reads go through the [`RetryPolicy`]. The `executeSlice` write is sent
//! exactly once: a broadcast that is retried blindly can land twice.

use std::time::Duration;

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::BlockNumberOrTag;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

use super::contract::{order_from_abi, ITwapOrders};
use super::error::{from_contract, from_get_order, from_rpc};
use crate::domain::{Order, OrderId};
use crate::error::{ChainError, ConfigError, Error, Result};
use crate::infrastructure::config::settings::PRIVATE_KEY_ENV;
use crate::infrastructure::retry::RetryPolicy;
use crate::port::{ChainGateway, NodeStatus, SliceReceipt};

/// Transaction settings for slice submissions.
#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub gas_limit: u64,
    pub confirmations: u64,
    pub confirmation_timeout: Duration,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            gas_limit: 300_000,
            confirmations: 1,
            confirmation_timeout: Duration::from_secs(120),
        }
    }
}

/// Gateway to the TWAP order contract on an EVM chain.
pub struct EvmGateway {
    provider: DynProvider,
    contract: ITwapOrders::ITwapOrdersInstance<DynProvider>,
    signer: Option<Address>,
    retry: RetryPolicy,
    submission: SubmissionSettings,
}

impl EvmGateway {
    /// Connect to `rpc_url`. Without a signer the gateway is read-only and
    /// `execute_slice` fails.
    ///
    /// # Errors
    ///
    /// Fails if the transport cannot be set up for the URL.
    pub async fn connect(
        rpc_url: &Url,
        contract: Address,
        signer: Option<PrivateKeySigner>,
        retry: RetryPolicy,
        submission: SubmissionSettings,
    ) -> Result<Self> {
        let signer_address = signer.as_ref().map(PrivateKeySigner::address);

        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect(rpc_url.as_str())
                .await
                .map_err(|e| from_rpc("connect", &e))?
                .erased(),
            None => ProviderBuilder::new()
                .connect(rpc_url.as_str())
                .await
                .map_err(|e| from_rpc("connect", &e))?
                .erased(),
        };

        info!(
            rpc_url = %rpc_url,
            contract = %contract,
            signer = ?signer_address,
            "EVM gateway connected"
        );

        Ok(Self::from_provider(
            provider,
            contract,
            signer_address,
            retry,
            submission,
        ))
    }

    /// Wrap an existing provider.
    #[must_use]
    pub fn from_provider(
        provider: DynProvider,
        contract: Address,
        signer: Option<Address>,
        retry: RetryPolicy,
        submission: SubmissionSettings,
    ) -> Self {
        let contract = ITwapOrders::new(contract, provider.clone());
        Self {
            provider,
            contract,
            signer,
            retry,
            submission,
        }
    }

    /// Provider handle, shared with the event stream.
    #[must_use]
    pub fn provider(&self) -> DynProvider {
        self.provider.clone()
    }

    #[must_use]
    pub fn contract_address(&self) -> Address {
        *self.contract.address()
    }

    async fn send_slice(&self, id: OrderId, gas_price: u128) -> Result<SliceReceipt> {
        let call = self
            .contract
            .executeSlice(id.to_u256())
            .gas(self.submission.gas_limit)
            .gas_price(gas_price);

        let request_timeout = self.retry.request_timeout();
        let pending = match timeout(request_timeout, call.send()).await {
            Ok(sent) => sent.map_err(|e| from_contract("executeSlice", &e))?,
            Err(_) => return Err(ChainError::timed_out("executeSlice", request_timeout).into()),
        };

        let tx_hash = pending.tx_hash().to_string();
        info!(order_id = %id, tx_hash = %tx_hash, gas_price, "Slice transaction sent");

        let receipt = pending
            .with_required_confirmations(self.submission.confirmations)
            .with_timeout(Some(self.submission.confirmation_timeout))
            .get_receipt()
            .await
            .map_err(|e| ChainError::Unavailable {
                operation: "executeSlice",
                attempts: 1,
                reason: format!("no receipt for {tx_hash}: {e}"),
            })?;

        if !receipt.status() {
            return Err(ChainError::ExecutionReverted {
                order_id: id,
                tx_hash: Some(tx_hash),
                reason: "transaction mined with status 0".to_string(),
            }
            .into());
        }

        Ok(SliceReceipt {
            tx_hash,
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
        })
    }
}

#[async_trait]
impl ChainGateway for EvmGateway {
    async fn fetch_order(&self, id: OrderId) -> Result<Order> {
        let contract = &self.contract;
        let raw = self
            .retry
            .run("getOrder", move || async move {
                contract
                    .getOrder(id.to_u256())
                    .call()
                    .await
                    .map_err(|e| Error::from(from_get_order(id, &e)))
            })
            .await?;

        let order = order_from_abi(id, raw)?;
        debug!(
            order_id = %id,
            creator = %order.creator,
            token_in = %order.token_in,
            token_out = %order.token_out,
            total_amount = %order.total_amount,
            interval = order.interval,
            duration = order.duration,
            slices_executed = order.slices_executed,
            next_execution_time = order.next_execution_time,
            total_out = %order.total_out,
            cancelled = order.cancelled,
            "Fetched order"
        );
        Ok(order)
    }

    async fn order_count(&self) -> Result<u64> {
        let contract = &self.contract;
        let count = self
            .retry
            .run("nextOrderId", move || async move {
                contract
                    .nextOrderId()
                    .call()
                    .await
                    .map_err(|e| Error::from(from_contract("nextOrderId", &e)))
            })
            .await?;

        u64::try_from(count).map_err(|_| {
            ChainError::Decode {
                what: "nextOrderId",
                reason: format!("{count} does not fit in 64 bits"),
            }
            .into()
        })
    }

    async fn gas_price(&self) -> Result<u128> {
        let provider = &self.provider;
        self.retry
            .run("eth_gasPrice", move || async move {
                provider
                    .get_gas_price()
                    .await
                    .map_err(|e| Error::from(from_rpc("eth_gasPrice", &e)))
            })
            .await
    }

    async fn execute_slice(
        &self,
        id: OrderId,
        max_gas_price: Option<u128>,
    ) -> Result<SliceReceipt> {
        if self.signer.is_none() {
            return Err(ConfigError::MissingField {
                field: PRIVATE_KEY_ENV,
            }
            .into());
        }

        let gas_price = self.gas_price().await?;
        if let Some(ceiling) = max_gas_price.filter(|ceiling| gas_price > *ceiling) {
            return Err(ChainError::GasPriceAboveCeiling {
                price: gas_price,
                ceiling,
            }
            .into());
        }
        self.send_slice(id, gas_price).await
    }

    async fn node_status(&self) -> Result<NodeStatus> {
        let provider = &self.provider;

        let chain_id = self
            .retry
            .run("eth_chainId", move || async move {
                provider
                    .get_chain_id()
                    .await
                    .map_err(|e| Error::from(from_rpc("eth_chainId", &e)))
            })
            .await?;

        let block = self
            .retry
            .run("eth_getBlockByNumber", move || async move {
                provider
                    .get_block_by_number(BlockNumberOrTag::Latest)
                    .await
                    .map_err(|e| Error::from(from_rpc("eth_getBlockByNumber", &e)))
            })
            .await?
            .ok_or_else(|| ChainError::Decode {
                what: "eth_getBlockByNumber",
                reason: "node returned no latest block".to_string(),
            })?;

        Ok(NodeStatus {
            chain_id,
            latest_block: block.header.number,
            latest_block_timestamp: block.header.timestamp,
        })
    }

    fn signer_address(&self) -> Option<String> {
        self.signer.map(|address| address.to_string())
    }

    fn chain_name(&self) -> &'static str {
        "evm"
    }
}
