//! Factory functions that build adapters from [`Config`](super::config::Config).
//!
//! # Submodules
//!
//! - [`chain`] - EVM gateway, signer and event stream construction

pub mod chain;

pub use chain::{
    build_chain, build_event_stream, build_gateway, build_signer, ChainComponents,
    SignerRequirement,
};
