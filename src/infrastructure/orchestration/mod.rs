//! Runtime wiring and lifecycle management.

pub mod runtime;
pub mod startup;

pub use runtime::{keeper_settings, run_keeper};
#[cfg(feature = "evm")]
pub use runtime::{run, run_with_shutdown};
pub use startup::{block_age, verify_node};
