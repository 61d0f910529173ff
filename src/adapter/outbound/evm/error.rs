//! Mapping alloy failures onto [`ChainError`].
//!
//! Only transport-level failures are marked transient. An error response from
//! the node is an answer, not an outage, and is never retried.

use alloy_transport::TransportError;

use crate::domain::OrderId;
use crate::error::ChainError;

/// Classify a JSON-RPC failure.
pub fn from_rpc(operation: &'static str, err: &TransportError) -> ChainError {
    if let Some(payload) = err.as_error_resp() {
        return ChainError::Rpc {
            operation,
            reason: format!("{} (code {})", payload.message, payload.code),
        };
    }
    if err.is_transport_error() || err.is_null_resp() {
        return ChainError::Transport {
            operation,
            reason: err.to_string(),
        };
    }
    ChainError::Decode {
        what: operation,
        reason: err.to_string(),
    }
}

/// Classify a failed contract read.
pub fn from_contract(operation: &'static str, err: &alloy_contract::Error) -> ChainError {
    match err {
        alloy_contract::Error::TransportError(rpc) => from_rpc(operation, rpc),
        alloy_contract::Error::PendingTransactionError(pending) => ChainError::Transport {
            operation,
            reason: pending.to_string(),
        },
        other => ChainError::Decode {
            what: operation,
            reason: other.to_string(),
        },
    }
}

/// Classify a failed `getOrder` read.
///
/// A reverted view call means the contract rejected the id.
pub fn from_get_order(id: OrderId, err: &alloy_contract::Error) -> ChainError {
    match from_contract("getOrder", err) {
        ChainError::Rpc { reason, .. } if is_revert(&reason) => ChainError::OrderNotFound(id),
        other => other,
    }
}

fn is_revert(message: &str) -> bool {
    message.to_ascii_lowercase().contains("revert")
}
