//! Application services (use cases).
//!
//! These services hold the keeper's control flow. They depend only on the
//! domain and on the traits in [`crate::port`]; adapters are injected.

pub mod bootstrap;
pub mod keeper;
pub mod scheduler;
pub mod store;
pub mod watcher;

pub use bootstrap::{Bootstrapper, SeedReport};
pub use keeper::{Keeper, KeeperSettings};
pub use scheduler::{DeferReason, Scheduler, SchedulerSettings, TickAction, TickReport};
pub use store::OrderStore;
pub use watcher::EventWatcher;
