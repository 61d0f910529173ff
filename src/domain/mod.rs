//! Chain-agnostic domain types for TWAP order tracking.
//!
//! Nothing in this module performs I/O. Orders are snapshots of contract
//! state and every lifecycle decision is a pure function of a snapshot and
//! the current unix time.

pub mod event;
pub mod id;
pub mod order;

pub use event::OrderCreated;
pub use id::OrderId;
pub use order::{Order, OrderPhase};
