//! Chain gateway port for order-contract reads and writes.
//!
//! This is the only way the keeper talks to the chain when it is not
//! listening for events. Implementations own transport concerns: bounded
//! waits, retry of transient read failures, signing and broadcasting.

use async_trait::async_trait;

use crate::domain::{Order, OrderId};
use crate::error::Result;

/// Receipt of a successfully mined `executeSlice` transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceReceipt {
    /// Transaction hash, hex encoded.
    pub tx_hash: String,
    pub gas_used: u64,
    pub block_number: Option<u64>,
}

/// Connectivity snapshot used by the startup check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub chain_id: u64,
    pub latest_block: u64,
    /// Unix timestamp of the latest block.
    pub latest_block_timestamp: u64,
}

/// Port for the order contract.
///
/// # Errors
///
/// Read failures that persist past the retry budget surface as
/// [`ChainError::Unavailable`](crate::error::ChainError::Unavailable).
/// A slice transaction mined with failure status surfaces as
/// [`ChainError::ExecutionReverted`](crate::error::ChainError::ExecutionReverted)
/// and is never retried by the gateway.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Fetch the current state of one order.
    ///
    /// Returns [`ChainError::OrderNotFound`](crate::error::ChainError::OrderNotFound)
    /// for ids the contract does not know.
    async fn fetch_order(&self, id: OrderId) -> Result<Order>;

    /// Number of orders ever created (`nextOrderId`).
    async fn order_count(&self) -> Result<u64>;

    /// Current network gas price in wei.
    async fn gas_price(&self) -> Result<u128>;

    /// Sign, broadcast and wait for the `executeSlice(id)` transaction.
    ///
    /// The gas price is quoted right before signing. If it is above
    /// `max_gas_price` nothing is sent and
    /// [`ChainError::GasPriceAboveCeiling`](crate::error::ChainError::GasPriceAboveCeiling)
    /// is returned.
    async fn execute_slice(
        &self,
        id: OrderId,
        max_gas_price: Option<u128>,
    ) -> Result<SliceReceipt>;

    /// Chain id, head block and head timestamp.
    async fn node_status(&self) -> Result<NodeStatus>;

    /// Address that signs slice transactions, if a signer is configured.
    fn signer_address(&self) -> Option<String>;

    /// Gateway name for logging.
    fn chain_name(&self) -> &'static str;
}
