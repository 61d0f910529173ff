//! Order-creation event stream port.

use async_trait::async_trait;

use crate::domain::OrderCreated;
use crate::error::Error;

/// Items produced by an [`OrderEventStream`].
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A new order was created on-chain.
    OrderCreated(OrderCreated),
    /// The subscription broke; the stream must be resubscribed.
    Disconnected { reason: String },
}

/// A restartable, infinite source of `OrderCreated` notifications.
///
/// Implementations may deliver the same event more than once across a
/// resubscription. Consumers must treat delivery as at-least-once.
#[async_trait]
pub trait OrderEventStream: Send {
    /// Start (or restart) the subscription.
    async fn subscribe(&mut self) -> Result<(), Error>;

    /// Wait for the next item.
    ///
    /// Returns `None` only if the stream has ended for good.
    async fn next_event(&mut self) -> Option<StreamEvent>;

    /// Stream name for logging.
    fn source_name(&self) -> &'static str;
}
