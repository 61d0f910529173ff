//! Infrastructure layer.
//!
//! Technical concerns that support the application without containing
//! business logic: configuration, retry and reconnection, adapter wiring and
//! the runtime lifecycle.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`factory`] - Adapter construction from configuration
//! - [`orchestration`] - Startup check and runtime lifecycle
//! - [`retry`] - Bounded retry for chain reads
//! - [`subscription`] - Event feed resubscription

pub mod config;
#[cfg(feature = "evm")]
pub mod factory;
pub mod orchestration;
pub mod retry;
pub mod subscription;
