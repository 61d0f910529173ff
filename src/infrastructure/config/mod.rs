//! Infrastructure configuration modules.

pub mod chain;
pub mod keeper;
pub mod logging;
pub mod reconnection;
pub mod rpc;
pub mod settings;

pub use settings::Config;
