//! Order store properties.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use twap_keeper::application::OrderStore;
use twap_keeper::domain::OrderId;
use twap_keeper::testkit::domain::OrderBuilder;

proptest! {
    #[test]
    fn concurrent_adds_are_never_lost(
        batches in prop::collection::vec(prop::collection::vec(0u64..500, 0..40), 1..6)
    ) {
        let store = Arc::new(OrderStore::new());

        let handles: Vec<_> = batches
            .iter()
            .cloned()
            .map(|batch| {
                let store = store.clone();
                thread::spawn(move || {
                    for raw in batch {
                        store.add(OrderId::new(raw));
                        let snapshot = store.snapshot();
                        assert!(snapshot.windows(2).all(|pair| pair[0] < pair[1]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected: BTreeSet<OrderId> =
            batches.into_iter().flatten().map(OrderId::new).collect();
        let snapshot: Vec<OrderId> = store.snapshot();
        prop_assert_eq!(snapshot, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn snapshot_is_a_set_after_interleaved_adds_and_removes(
        ops in prop::collection::vec((any::<bool>(), 0u64..50), 0..200)
    ) {
        let store = OrderStore::new();
        let mut model = BTreeSet::new();

        for (add, raw) in ops {
            let id = OrderId::new(raw);
            if add {
                prop_assert_eq!(store.add(id), model.insert(id));
            } else {
                prop_assert_eq!(store.remove(id), model.remove(&id));
            }
        }

        prop_assert_eq!(store.len(), model.len());
        prop_assert_eq!(store.snapshot(), model.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn total_slices_is_floor_of_duration_over_interval(
        interval in 0u64..10_000,
        duration in 0u64..1_000_000,
    ) {
        let order = OrderBuilder::new(0).interval(interval).duration(duration).build();
        let expected = if interval == 0 { 0 } else { duration / interval };
        prop_assert_eq!(order.total_slices(), expected);
        prop_assert!(order.total_slices() * interval <= duration);
    }

    #[test]
    fn trackable_orders_are_live_and_unfinished(
        slices in 0u64..10,
        now in 0u64..3_000,
        cancelled in any::<bool>(),
    ) {
        let mut builder = OrderBuilder::new(0).slices_executed(slices);
        if cancelled {
            builder = builder.cancelled();
        }
        let order = builder.build();

        prop_assert_eq!(
            order.is_trackable(now),
            !cancelled && slices < 6 && now <= 1_060
        );
        prop_assert_eq!(order.is_trackable(now), !order.phase(now).is_terminal());
    }
}
