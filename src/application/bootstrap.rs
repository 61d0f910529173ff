//! Startup reconstruction of the tracked order set.
//!
//! The keeper persists nothing locally. On every start it walks every order
//! id the contract has ever issued and keeps the ones that are still
//! trackable, which makes restarts idempotent: two scans against the same
//! chain state at the same time produce the same set.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::store::OrderStore;
use crate::domain::{Order, OrderId};
use crate::error::{ChainError, Error, Result};
use crate::port::{ChainGateway, Clock};

/// Outcome of a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Value of `nextOrderId` at scan time.
    pub scanned: u64,
    /// Trackable orders, ascending by id.
    pub eligible: Vec<Order>,
    /// Ids that could not be fetched and were skipped.
    pub failed: Vec<OrderId>,
}

impl SeedReport {
    /// Ids of the trackable orders.
    #[must_use]
    pub fn ids(&self) -> Vec<OrderId> {
        self.eligible.iter().map(|order| order.id).collect()
    }
}

/// Seeds the [`OrderStore`] from on-chain history.
pub struct Bootstrapper {
    gateway: Arc<dyn ChainGateway>,
    clock: Arc<dyn Clock>,
}

impl Bootstrapper {
    pub fn new(gateway: Arc<dyn ChainGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { gateway, clock }
    }

    /// Scan `0..nextOrderId` and classify each order.
    ///
    /// Per-order fetch failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the order counter itself cannot be read.
    pub async fn scan(&self) -> Result<SeedReport> {
        let count = self.gateway.order_count().await?;
        let now = self.clock.now();
        info!(orders = count, now, "Scanning order history");

        let mut report = SeedReport {
            scanned: count,
            ..SeedReport::default()
        };

        for raw in 0..count {
            let id = OrderId::new(raw);
            match self.gateway.fetch_order(id).await {
                Ok(order) if order.is_trackable(now) => {
                    debug!(
                        order_id = %id,
                        slices_executed = order.slices_executed,
                        total_slices = order.total_slices(),
                        next_execution_time = order.next_execution_time,
                        "Order eligible for tracking"
                    );
                    report.eligible.push(order);
                }
                Ok(order) => {
                    debug!(order_id = %id, phase = %order.phase(now), "Order not trackable");
                }
                Err(Error::Chain(ChainError::OrderNotFound(_))) => {
                    warn!(order_id = %id, "Order below nextOrderId not found, skipping");
                }
                Err(e) => {
                    warn!(order_id = %id, error = %e, "Failed to fetch order during scan, skipping");
                    report.failed.push(id);
                }
            }
        }

        Ok(report)
    }

    /// Scan and insert every trackable order into `store`.
    ///
    /// Returns the seeded ids.
    ///
    /// # Errors
    ///
    /// See [`Bootstrapper::scan`].
    pub async fn seed(&self, store: &OrderStore) -> Result<Vec<OrderId>> {
        let report = self.scan().await?;
        let ids = report.ids();
        let added = store.extend(ids.iter().copied());

        info!(
            scanned = report.scanned,
            eligible = ids.len(),
            added,
            failed = report.failed.len(),
            "Order store seeded"
        );

        Ok(ids)
    }
}
