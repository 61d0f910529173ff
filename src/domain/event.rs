//! Order-creation notifications.

use alloy_primitives::{Address, B256, U256};
use serde::Serialize;

use super::id::OrderId;

/// An `OrderCreated` log emitted by the contract.
///
/// Only `order_id` drives keeper behaviour; the rest is carried for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub creator: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub total_amount: U256,
    pub duration: u64,
    pub interval: u64,
    pub slice_size: U256,
    /// Block the log was included in, when the node reports it.
    pub block_number: Option<u64>,
    pub transaction_hash: Option<B256>,
}
