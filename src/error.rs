use std::time::Duration;

use thiserror::Error;

use crate::domain::OrderId;

/// Configuration-related errors with structured variants.
///
/// Any of these at startup is fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised while talking to the chain.
#[derive(Error, Debug, Clone)]
pub enum ChainError {
    /// Network-level failure (timeout, dropped connection). Safe to retry.
    #[error("{operation}: transport error: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    /// The node answered with an error response.
    #[error("{operation}: rpc error: {reason}")]
    Rpc {
        operation: &'static str,
        reason: String,
    },

    /// The chain could not be reached within the retry or confirmation budget.
    #[error("chain unavailable during {operation} after {attempts} attempt(s): {reason}")]
    Unavailable {
        operation: &'static str,
        attempts: u32,
        reason: String,
    },

    /// A slice transaction was mined with a failure status.
    #[error("executeSlice reverted for order {order_id}: {reason}")]
    ExecutionReverted {
        order_id: OrderId,
        tx_hash: Option<String>,
        reason: String,
    },

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// The gas price quoted for signing exceeds the configured ceiling.
    #[error("gas price {price} wei is above the ceiling of {ceiling} wei")]
    GasPriceAboveCeiling { price: u128, ceiling: u128 },

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("chain id mismatch: configured {configured}, node reports {actual}")]
    ChainIdMismatch { configured: u64, actual: u64 },
}

impl ChainError {
    /// Whether the failure is worth retrying with backoff.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Build a timeout error for an operation bounded by `after`.
    #[must_use]
    pub fn timed_out(operation: &'static str, after: Duration) -> Self {
        Self::Transport {
            operation,
            reason: format!("timed out after {}ms", after.as_millis()),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Task(String),
}

impl Error {
    /// Return the chain error, if this is one.
    #[must_use]
    pub const fn as_chain(&self) -> Option<&ChainError> {
        match self {
            Self::Chain(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this error should be retried with backoff.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Chain(err) => err.is_transient(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
