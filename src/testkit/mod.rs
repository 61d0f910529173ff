//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`chain`] - `MockChain`, an in-memory order contract, and `ManualClock`.
//! - [`stream`] - Mock [`OrderEventStream`](crate::port::OrderEventStream)
//!   implementations: `ScriptedStream`, `ChannelStream`.
//! - [`domain`] - Builders for orders and order-created events.
//! - [`config`] - Canonical test configurations (reconnection, retry).

pub mod chain;
pub mod config;
pub mod domain;
pub mod stream;
