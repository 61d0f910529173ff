//! Registry of orders worth polling.
//!
//! The store is a cache, not a source of truth: membership only means that
//! at last observation the order was not cancelled, not expired and had
//! slices remaining. It is shared between the event watcher (which adds) and
//! the scheduler (which snapshots and removes), so every operation takes a
//! single lock and no caller ever sees a half-applied mutation.

use std::collections::BTreeSet;

use parking_lot::Mutex;

use crate::domain::OrderId;

/// Thread-safe set of tracked order ids.
#[derive(Debug, Default)]
pub struct OrderStore {
    ids: Mutex<BTreeSet<OrderId>>,
}

impl OrderStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an order. Idempotent; returns `true` if the id was not yet tracked.
    pub fn add(&self, id: OrderId) -> bool {
        self.ids.lock().insert(id)
    }

    /// Track several orders under one lock. Returns how many were newly added.
    pub fn extend<I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = OrderId>,
    {
        let mut guard = self.ids.lock();
        ids.into_iter().filter(|id| guard.insert(*id)).count()
    }

    /// Stop tracking an order. Returns `true` if it was tracked.
    pub fn remove(&self, id: OrderId) -> bool {
        self.ids.lock().remove(&id)
    }

    /// Copy of the tracked ids in ascending order.
    ///
    /// The copy is detached from the store, so callers may iterate it while
    /// other tasks keep adding.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OrderId> {
        self.ids.lock().iter().copied().collect()
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.ids.lock().contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let store = OrderStore::new();
        assert!(store.add(OrderId::new(4)));
        assert!(!store.add(OrderId::new(4)));
        assert_eq!(store.snapshot(), vec![OrderId::new(4)]);
    }

    #[test]
    fn remove_reports_membership() {
        let store = OrderStore::new();
        store.add(OrderId::new(1));
        assert!(store.remove(OrderId::new(1)));
        assert!(!store.remove(OrderId::new(1)));
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_is_sorted_and_detached() {
        let store = OrderStore::new();
        store.extend([OrderId::new(9), OrderId::new(2), OrderId::new(5)]);

        let snapshot = store.snapshot();
        store.add(OrderId::new(1));

        assert_eq!(
            snapshot,
            vec![OrderId::new(2), OrderId::new(5), OrderId::new(9)]
        );
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn extend_counts_only_new_ids() {
        let store = OrderStore::new();
        store.add(OrderId::new(3));
        let added = store.extend([OrderId::new(3), OrderId::new(4), OrderId::new(4)]);
        assert_eq!(added, 1);
        assert!(store.contains(OrderId::new(4)));
    }
}
