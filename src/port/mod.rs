//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                 ┌──────────────────────────────┐
//!                 │         Application          │
//!                 │ Scheduler · Watcher · Store  │
//!                 └──────────────┬───────────────┘
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//! ┌──────────────┐     ┌──────────────────┐      ┌─────────────┐
//! │ ChainGateway │     │ OrderEventStream │      │    Clock    │
//! └──────────────┘     └──────────────────┘      └─────────────┘
//! ```

pub mod outbound;

pub use outbound::chain::{ChainGateway, NodeStatus, SliceReceipt};
pub use outbound::clock::{Clock, SystemClock};
pub use outbound::stream::{OrderEventStream, StreamEvent};
