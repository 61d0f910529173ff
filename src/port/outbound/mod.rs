//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the keeper's infrastructure dependencies: the
//! order contract, its event feed and the wall clock.

pub mod chain;
pub mod clock;
pub mod stream;
