//! Order-creation watcher.
//!
//! Feeds newly created order ids into the [`OrderStore`]. The watcher never
//! deduplicates: a resubscription may replay events, and the store's
//! idempotent `add` absorbs the overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::time::sleep;
use tracing::{error, info, warn};

use super::store::OrderStore;
use crate::domain::OrderCreated;
use crate::port::{OrderEventStream, StreamEvent};

/// Default wait before resubscribing after the stream breaks.
pub const DEFAULT_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Long-lived consumer of an [`OrderEventStream`].
pub struct EventWatcher {
    stream: Box<dyn OrderEventStream>,
    store: Arc<OrderStore>,
    resubscribe_delay: Duration,
    subscribed: Option<oneshot::Sender<()>>,
}

impl EventWatcher {
    pub fn new(stream: Box<dyn OrderEventStream>, store: Arc<OrderStore>) -> Self {
        Self {
            stream,
            store,
            resubscribe_delay: DEFAULT_RESUBSCRIBE_DELAY,
            subscribed: None,
        }
    }

    /// Override the pause between a broken subscription and the next attempt.
    #[must_use]
    pub fn with_resubscribe_delay(mut self, delay: Duration) -> Self {
        self.resubscribe_delay = delay;
        self
    }

    /// Receiver that resolves once the first subscription has succeeded.
    ///
    /// It errors instead if the watcher stops before ever subscribing.
    pub fn first_subscription(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.subscribed = Some(tx);
        rx
    }

    /// Consume events until `shutdown` flips to `true`.
    ///
    /// Subscription failures are logged and retried; they never end the loop.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let source = self.stream.source_name();
        info!(source, "Event watcher started");

        if self.resubscribe(&mut shutdown, false).await {
            if let Some(subscribed) = self.subscribed.take() {
                let _ = subscribed.send(());
            }
            loop {
                let next = tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                        continue;
                    }
                    next = self.stream.next_event() => next,
                };

                match next {
                    Some(StreamEvent::OrderCreated(event)) => self.record(&event),
                    Some(StreamEvent::Disconnected { reason }) => {
                        warn!(source, reason = %reason, "Event stream disconnected, resubscribing");
                        if !self.resubscribe(&mut shutdown, true).await {
                            break;
                        }
                    }
                    None => {
                        warn!(source, "Event stream ended, resubscribing");
                        if !self.resubscribe(&mut shutdown, true).await {
                            break;
                        }
                    }
                }
            }
        }

        info!(source, "Event watcher stopped");
    }

    fn record(&self, event: &OrderCreated) {
        let added = self.store.add(event.order_id);
        info!(
            order_id = %event.order_id,
            creator = %event.creator,
            token_in = %event.token_in,
            token_out = %event.token_out,
            total_amount = %event.total_amount,
            duration = event.duration,
            interval = event.interval,
            slice_size = %event.slice_size,
            block_number = event.block_number,
            tx_hash = ?event.transaction_hash,
            added,
            "Order created"
        );
    }

    /// Subscribe until it succeeds. Returns `false` if shutdown won the race.
    async fn resubscribe(
        &mut self,
        shutdown: &mut watch::Receiver<bool>,
        pause_first: bool,
    ) -> bool {
        let mut pause_next = pause_first;
        loop {
            if pause_next && !pause(self.resubscribe_delay, shutdown).await {
                return false;
            }
            if *shutdown.borrow() {
                return false;
            }

            match self.stream.subscribe().await {
                Ok(()) => return true,
                Err(e) => {
                    error!(
                        source = self.stream.source_name(),
                        error = %e,
                        retry_secs = self.resubscribe_delay.as_secs(),
                        "Failed to subscribe to order events"
                    );
                    pause_next = true;
                }
            }
        }
    }
}

/// Sleep for `delay` unless shutdown arrives first.
async fn pause(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = sleep(delay) => true,
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderId;
    use crate::error::{ChainError, Error};
    use crate::testkit::domain::{disconnect_event, order_created_event};
    use crate::testkit::stream::{channel_stream, ScriptedStream};

    #[tokio::test]
    async fn created_orders_are_tracked() {
        let store = Arc::new(OrderStore::new());
        let (stream, handle) = channel_stream(8);
        let (tx, rx) = watch::channel(false);

        let watcher = EventWatcher::new(Box::new(stream), store.clone());
        let task = tokio::spawn(watcher.run(rx));

        handle.send(order_created_event(3)).await;
        handle.send(order_created_event(3)).await;
        handle.send(order_created_event(7)).await;

        for _ in 0..50 {
            if store.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(store.snapshot(), vec![OrderId::new(3), OrderId::new(7)]);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("watcher should stop")
            .unwrap();
        assert_eq!(handle.subscribe_count(), 1);
    }

    #[tokio::test]
    async fn resubscribes_after_disconnect_and_failed_subscribe() {
        let store = Arc::new(OrderStore::new());
        let stream = ScriptedStream::new()
            .with_subscribe_results(vec![
                Err(Error::Chain(ChainError::Transport {
                    operation: "eth_blockNumber",
                    reason: "connection refused".into(),
                })),
                Ok(()),
                Ok(()),
            ])
            .with_events(vec![
                Some(disconnect_event("node restarted")),
                Some(order_created_event(1)),
            ]);
        let subscribe_count = stream.subscribe_counter();
        let (tx, rx) = watch::channel(false);

        let watcher = EventWatcher::new(Box::new(stream), store.clone())
            .with_resubscribe_delay(Duration::from_millis(1));
        let task = tokio::spawn(watcher.run(rx));

        for _ in 0..100 {
            if store.contains(OrderId::new(1)) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(store.contains(OrderId::new(1)));
        assert!(subscribe_count.load(std::sync::atomic::Ordering::SeqCst) >= 3);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("watcher should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn first_subscription_is_signalled() {
        let (stream, handle) = channel_stream(8);
        let mut watcher = EventWatcher::new(Box::new(stream), Arc::new(OrderStore::new()));
        let subscribed = watcher.first_subscription();
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(watcher.run(rx));

        tokio::time::timeout(Duration::from_secs(1), subscribed)
            .await
            .expect("subscription should be signalled")
            .unwrap();
        assert_eq!(handle.subscribe_count(), 1);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("watcher should stop")
            .unwrap();
    }
}
