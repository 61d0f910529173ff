//! twap-keeper - off-chain keeper for time-sliced TWAP orders.
//!
//! TWAP orders live in an on-chain contract that splits a large swap into
//! equal slices executed at a fixed interval. The contract cannot wake itself
//! up, so this keeper watches for new orders, tracks the ones that still have
//! slices to run, and calls `executeSlice` whenever one is due.
//!
//! # Architecture
//!
//! - **`domain`** - Order snapshots and lifecycle rules, no I/O
//! - **`port`** - Traits at the I/O seams: `ChainGateway`, `OrderEventStream`, `Clock`
//! - **`application`** - `OrderStore`, `Bootstrapper`, `EventWatcher`,
//!   `Scheduler` and the `Keeper` that runs them
//! - **`adapter`** - EVM implementation of the ports and the CLI
//! - **`infrastructure`** - Configuration, retry, reconnection and runtime wiring
//!
//! # Features
//!
//! - `evm` (default) - alloy-based chain adapter, signer and CLI
//! - `testkit` - in-memory chain, scripted streams and builders for tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use twap_keeper::application::OrderStore;
//! use twap_keeper::domain::OrderId;
//!
//! let store = Arc::new(OrderStore::new());
//! store.add(OrderId::new(7));
//! assert!(store.contains(OrderId::new(7)));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
