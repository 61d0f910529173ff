//! EVM JSON-RPC adapters for the TWAP order contract.
//!
//! - [`EvmGateway`] implements [`ChainGateway`](crate::port::ChainGateway)
//! - [`EvmOrderStream`] implements [`OrderEventStream`](crate::port::OrderEventStream)
//!   by polling `OrderCreated` logs

pub mod contract;
pub mod error;
mod gateway;
mod stream;

pub use gateway::{EvmGateway, SubmissionSettings};
pub use stream::{EvmOrderStream, DEFAULT_MAX_LOG_RANGE};
