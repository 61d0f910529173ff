//! Startup seeding and restart behaviour.

use std::sync::Arc;

use twap_keeper::application::{Bootstrapper, OrderStore, Scheduler, SchedulerSettings};
use twap_keeper::domain::OrderId;
use twap_keeper::error::{ChainError, Error};
use twap_keeper::testkit::chain::{ManualClock, MockChain};
use twap_keeper::testkit::domain::OrderBuilder;

fn ids(raw: &[u64]) -> Vec<OrderId> {
    raw.iter().copied().map(OrderId::new).collect()
}

/// Orders 0..6 in every lifecycle state at t = 1_025.
fn populated_chain(clock: Arc<ManualClock>) -> Arc<MockChain> {
    let chain = Arc::new(MockChain::new().with_clock(clock));
    chain.insert(OrderBuilder::new(0).build());
    chain.insert(OrderBuilder::new(1).slices_executed(2).build());
    chain.insert(OrderBuilder::new(2).slices_executed(6).build());
    chain.insert(OrderBuilder::new(3).cancelled().build());
    chain.insert(OrderBuilder::new(4).start(0).build());
    chain.insert(OrderBuilder::new(5).start(5_000).build());
    chain
}

#[tokio::test]
async fn seeding_twice_yields_the_same_set() {
    let clock = Arc::new(ManualClock::new(1_025));
    let chain = populated_chain(clock.clone());
    let bootstrapper = Bootstrapper::new(chain.clone(), clock.clone());

    let store = OrderStore::new();
    let first = bootstrapper.seed(&store).await.unwrap();
    let after_first = store.snapshot();
    let second = bootstrapper.seed(&store).await.unwrap();

    assert_eq!(first, ids(&[0, 1, 5]));
    assert_eq!(first, second);
    assert_eq!(store.snapshot(), after_first);
}

#[tokio::test]
async fn restart_rebuilds_the_set_a_running_keeper_would_have() {
    let clock = Arc::new(ManualClock::new(1_000));
    let chain = populated_chain(clock.clone());

    // Keeper that has been running since t = 1_000.
    let running = Arc::new(OrderStore::new());
    Bootstrapper::new(chain.clone(), clock.clone())
        .seed(&running)
        .await
        .unwrap();
    let scheduler = Scheduler::new(
        chain.clone(),
        running.clone(),
        clock.clone(),
        SchedulerSettings::default(),
    );
    for _ in 0..6 {
        scheduler.tick().await;
        clock.advance(10);
    }
    // One more pass drops the orders that finished in the last window.
    scheduler.tick().await;

    // Fresh process started at the same moment.
    let restarted = OrderStore::new();
    Bootstrapper::new(chain.clone(), clock.clone())
        .seed(&restarted)
        .await
        .unwrap();

    assert_eq!(running.snapshot(), ids(&[5]));
    assert_eq!(restarted.snapshot(), running.snapshot());
}

#[tokio::test]
async fn restart_after_a_mined_slice_waits_for_the_next_window() {
    let clock = Arc::new(ManualClock::new(1_000));
    let chain = Arc::new(MockChain::new().with_clock(clock.clone()));
    chain.insert(OrderBuilder::new(0).interval(10).duration(60).build());
    let id = OrderId::new(0);

    // First process: the slice due at t = 1_000 is mined, then the process dies.
    let before_crash = Arc::new(OrderStore::new());
    Bootstrapper::new(chain.clone(), clock.clone())
        .seed(&before_crash)
        .await
        .unwrap();
    Scheduler::new(
        chain.clone(),
        before_crash,
        clock.clone(),
        SchedulerSettings::default(),
    )
    .tick()
    .await;
    assert_eq!(chain.submissions(id), 1);

    // Second process starts from chain state alone.
    let after_restart = Arc::new(OrderStore::new());
    Bootstrapper::new(chain.clone(), clock.clone())
        .seed(&after_restart)
        .await
        .unwrap();
    assert_eq!(after_restart.snapshot(), ids(&[0]));
    let scheduler = Scheduler::new(
        chain.clone(),
        after_restart.clone(),
        clock.clone(),
        SchedulerSettings::default(),
    );

    for now in [1_000, 1_003, 1_009] {
        clock.set(now);
        scheduler.tick().await;
    }
    assert_eq!(chain.submissions(id), 1);
    assert_eq!(chain.order(id).unwrap().slices_executed, 1);

    clock.set(1_010);
    scheduler.tick().await;
    assert_eq!(chain.submissions(id), 2);
    assert!(after_restart.contains(id));
}

#[tokio::test]
async fn unreadable_orders_are_skipped_not_fatal() {
    let clock = Arc::new(ManualClock::new(1_025));
    let chain = populated_chain(clock.clone());
    chain.fail_fetches(OrderId::new(1));

    let report = Bootstrapper::new(chain.clone(), clock).scan().await.unwrap();

    assert_eq!(report.scanned, 6);
    assert_eq!(report.ids(), ids(&[0, 5]));
    assert_eq!(report.failed, ids(&[1]));
}

#[tokio::test]
async fn gaps_below_the_counter_are_tolerated() {
    let clock = Arc::new(ManualClock::new(1_000));
    let chain = Arc::new(MockChain::new());
    chain.insert(OrderBuilder::new(2).build());
    chain.set_order_count(4);

    let report = Bootstrapper::new(chain, clock).scan().await.unwrap();

    assert_eq!(report.scanned, 4);
    assert_eq!(report.ids(), ids(&[2]));
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn unreadable_counter_fails_seeding() {
    let clock = Arc::new(ManualClock::new(1_000));
    let chain = populated_chain(clock.clone());
    chain.set_offline(true);

    let store = OrderStore::new();
    let result = Bootstrapper::new(chain, clock).seed(&store).await;

    assert!(matches!(
        result,
        Err(Error::Chain(ChainError::Unavailable { .. }))
    ));
    assert!(store.is_empty());
}
