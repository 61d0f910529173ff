//! Event subscription management.

pub mod reconnecting;

pub use reconnecting::ReconnectingOrderStream;
