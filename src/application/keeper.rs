//! Keeper assembly: seeding plus the two concurrent loops.
//!
//! The historical scan only starts once the event subscription is live, so
//! an order created while the scan runs is still picked up by the event
//! feed. Seeding and the feed may both add the same id; the store absorbs
//! the overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use super::bootstrap::Bootstrapper;
use super::scheduler::{Scheduler, SchedulerSettings};
use super::store::OrderStore;
use super::watcher::{EventWatcher, DEFAULT_RESUBSCRIBE_DELAY};
use crate::error::{Error, Result};
use crate::port::{ChainGateway, Clock, OrderEventStream};

/// Settings for a [`Keeper`].
#[derive(Debug, Clone)]
pub struct KeeperSettings {
    pub scheduler: SchedulerSettings,
    /// Pause between a broken event subscription and the next attempt.
    pub resubscribe_delay: Duration,
}

impl Default for KeeperSettings {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSettings::default(),
            resubscribe_delay: DEFAULT_RESUBSCRIBE_DELAY,
        }
    }
}

/// The assembled keeper.
pub struct Keeper {
    store: Arc<OrderStore>,
    bootstrapper: Bootstrapper,
    scheduler: Scheduler,
    watcher: EventWatcher,
}

impl Keeper {
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        stream: Box<dyn OrderEventStream>,
        clock: Arc<dyn Clock>,
        settings: KeeperSettings,
    ) -> Self {
        let store = Arc::new(OrderStore::new());
        let bootstrapper = Bootstrapper::new(gateway.clone(), clock.clone());
        let scheduler = Scheduler::new(gateway, store.clone(), clock, settings.scheduler);
        let watcher = EventWatcher::new(stream, store.clone())
            .with_resubscribe_delay(settings.resubscribe_delay);

        Self {
            store,
            bootstrapper,
            scheduler,
            watcher,
        }
    }

    /// Shared handle to the tracked order set.
    #[must_use]
    pub fn store(&self) -> Arc<OrderStore> {
        self.store.clone()
    }

    /// Subscribe to order events, seed from chain history, then run the
    /// watcher and the scheduler until `shutdown` flips to `true`.
    ///
    /// Seeding waits for the first successful subscription. Shutdown
    /// before that point ends the keeper without seeding.
    ///
    /// # Errors
    ///
    /// Fails if seeding cannot read the order counter, or if the watcher
    /// task panics.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let Self {
            store,
            bootstrapper,
            scheduler,
            mut watcher,
        } = self;

        let subscribed = watcher.first_subscription();
        let watcher_task = tokio::spawn(watcher.run(shutdown.clone()));

        if subscribed.await.is_err() {
            info!("Shutdown before the event subscription was established");
            return watcher_task
                .await
                .map_err(|e| Error::Task(format!("event watcher: {e}")));
        }

        let seeded = match bootstrapper.seed(&store).await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "Failed to seed order store");
                watcher_task.abort();
                return Err(e);
            }
        };
        info!(seeded = seeded.len(), tracked = store.len(), "Keeper running");

        scheduler.run(shutdown).await;

        watcher_task
            .await
            .map_err(|e| Error::Task(format!("event watcher: {e}")))?;

        info!(tracked = store.len(), "Keeper stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::domain::{Order, OrderId};
    use crate::port::{NodeStatus, SliceReceipt};
    use crate::testkit::chain::{ManualClock, MockChain};
    use crate::testkit::domain::{order_created_event, OrderBuilder};
    use crate::testkit::stream::{channel_stream, ScriptedStream};

    /// Records how many subscriptions had finished when `nextOrderId` was
    /// first read.
    struct CounterReadSpy {
        chain: Arc<MockChain>,
        subscriptions: Arc<AtomicU32>,
        at_first_read: Mutex<Option<u32>>,
    }

    #[async_trait]
    impl ChainGateway for CounterReadSpy {
        async fn fetch_order(&self, id: OrderId) -> Result<Order> {
            self.chain.fetch_order(id).await
        }

        async fn order_count(&self) -> Result<u64> {
            self.at_first_read
                .lock()
                .get_or_insert(self.subscriptions.load(Ordering::SeqCst));
            self.chain.order_count().await
        }

        async fn gas_price(&self) -> Result<u128> {
            self.chain.gas_price().await
        }

        async fn execute_slice(
            &self,
            id: OrderId,
            max_gas_price: Option<u128>,
        ) -> Result<SliceReceipt> {
            self.chain.execute_slice(id, max_gas_price).await
        }

        async fn node_status(&self) -> Result<NodeStatus> {
            self.chain.node_status().await
        }

        fn signer_address(&self) -> Option<String> {
            self.chain.signer_address()
        }

        fn chain_name(&self) -> &'static str {
            "spy"
        }
    }

    fn fast_settings() -> KeeperSettings {
        KeeperSettings {
            scheduler: SchedulerSettings {
                tick_interval: Duration::from_millis(5),
                ..SchedulerSettings::default()
            },
            resubscribe_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn seeds_then_tracks_new_orders() {
        let chain = Arc::new(MockChain::new());
        chain.insert(
            OrderBuilder::new(0)
                .start(1_000)
                .next_execution_time(5_000)
                .duration(10_000)
                .build(),
        );
        let clock = Arc::new(ManualClock::new(1_000));
        let (stream, handle) = channel_stream(8);

        let keeper = Keeper::new(chain.clone(), Box::new(stream), clock, fast_settings());
        let store = keeper.store();
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(keeper.run(rx));

        chain.insert(
            OrderBuilder::new(1)
                .start(1_000)
                .next_execution_time(5_000)
                .duration(10_000)
                .build(),
        );
        handle.send(order_created_event(1)).await;

        for _ in 0..100 {
            if store.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(store.snapshot(), vec![OrderId::new(0), OrderId::new(1)]);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("keeper should stop")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn seeding_failure_stops_the_keeper() {
        let chain = Arc::new(MockChain::new());
        chain.set_offline(true);
        let (stream, _handle) = channel_stream(8);

        let keeper = Keeper::new(
            chain,
            Box::new(stream),
            Arc::new(ManualClock::new(1_000)),
            fast_settings(),
        );
        let (_tx, rx) = watch::channel(false);

        assert!(keeper.run(rx).await.is_err());
    }

    #[tokio::test]
    async fn seeding_waits_for_the_event_subscription() {
        let chain = Arc::new(MockChain::new());
        chain.insert(
            OrderBuilder::new(0)
                .start(1_000)
                .next_execution_time(5_000)
                .duration(10_000)
                .build(),
        );
        let stream = ScriptedStream::new().with_subscribe_delay(Duration::from_millis(50));
        let spy = Arc::new(CounterReadSpy {
            chain,
            subscriptions: stream.subscribe_counter(),
            at_first_read: Mutex::new(None),
        });

        let keeper = Keeper::new(
            spy.clone(),
            Box::new(stream),
            Arc::new(ManualClock::new(1_000)),
            fast_settings(),
        );
        let store = keeper.store();
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(keeper.run(rx));

        for _ in 0..100 {
            if store.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(store.snapshot(), vec![OrderId::new(0)]);
        assert!(matches!(*spy.at_first_read.lock(), Some(n) if n >= 1));

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("keeper should stop")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn shutdown_before_subscribing_skips_seeding() {
        let chain = Arc::new(MockChain::new());
        chain.set_offline(true);
        let (stream, handle) = channel_stream(8);

        let keeper = Keeper::new(
            chain,
            Box::new(stream),
            Arc::new(ManualClock::new(1_000)),
            fast_settings(),
        );
        let (_tx, rx) = watch::channel(true);

        assert!(keeper.run(rx).await.is_ok());
        assert_eq!(handle.subscribe_count(), 0);
    }
}
