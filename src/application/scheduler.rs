//! Slice scheduling: the keeper's core tick loop.
//!
//! Every tick re-reads each tracked order from the chain and derives what to
//! do from that fresh snapshot alone. Nothing about an order's progress is
//! cached between ticks: the contract advances `slicesExecuted` and
//! `nextExecutionTime` itself, so a slice that was mined just before a crash
//! is visible to the next tick (or the next process) and is never
//! resubmitted early.
//!
//! Per order, checks run in a fixed order:
//!
//! 1. cancelled → remove
//! 2. window closed (`now > startTime + duration`) → remove, even if due
//! 3. all slices executed → remove without submitting
//! 4. due (`now >= nextExecutionTime`) → gas guard, then submit
//! 5. otherwise wait
//!
//! A failed or reverted submission leaves the order tracked; the next tick
//! re-evaluates it, which bounds retries to one per tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::store::OrderStore;
use crate::domain::{Order, OrderId, OrderPhase};
use crate::error::{ChainError, Error};
use crate::port::{ChainGateway, Clock, SliceReceipt};

/// Scheduler settings derived from configuration.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Period between ticks.
    pub tick_interval: Duration,
    /// Skip submissions while the network gas price (wei) is above this.
    pub max_gas_price_wei: Option<u128>,
    /// Evaluate orders but log instead of submitting.
    pub dry_run: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            max_gas_price_wei: None,
            dry_run: false,
        }
    }
}

/// Why a due order was not submitted this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferReason {
    /// Network gas price exceeds the configured ceiling.
    GasTooHigh { price: u128, ceiling: u128 },
    /// The gas price could not be read this tick.
    GasPriceUnavailable,
}

/// What the scheduler did with one order during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickAction {
    /// Removed from tracking in a terminal phase.
    Removed(OrderPhase),
    /// The contract does not know this id; removed from tracking.
    Dropped,
    /// A slice transaction was mined successfully.
    Submitted(SliceReceipt),
    /// A slice transaction was mined with failure status.
    Reverted { reason: String },
    /// Due, but held back until a later tick.
    Deferred(DeferReason),
    /// Not yet due.
    Waiting { due_in: u64 },
    /// Due, and would have been submitted outside dry-run mode.
    DryRun,
    /// Fetching or submitting failed; retried next tick.
    Failed { reason: String },
}

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Unix time when the tick started.
    pub started_at: u64,
    pub actions: Vec<(OrderId, TickAction)>,
    /// Shutdown was requested before every tracked order was visited.
    pub interrupted: bool,
}

impl TickReport {
    /// Action taken for `id`, if it was visited.
    #[must_use]
    pub fn action(&self, id: OrderId) -> Option<&TickAction> {
        self.actions
            .iter()
            .find(|(visited, _)| *visited == id)
            .map(|(_, action)| action)
    }

    #[must_use]
    pub fn submitted(&self) -> usize {
        self.count(|action| matches!(action, TickAction::Submitted(_)))
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        self.count(|action| matches!(action, TickAction::Removed(_) | TickAction::Dropped))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|action| {
            matches!(
                action,
                TickAction::Failed { .. } | TickAction::Reverted { .. }
            )
        })
    }

    fn count(&self, predicate: impl Fn(&TickAction) -> bool) -> usize {
        self.actions
            .iter()
            .filter(|(_, action)| predicate(action))
            .count()
    }
}

/// Network gas price, fetched at most once per tick.
#[derive(Debug, Clone, Copy)]
enum GasQuote {
    Unfetched,
    Price(u128),
    Unavailable,
}

/// Drives slice execution for tracked orders.
pub struct Scheduler {
    gateway: Arc<dyn ChainGateway>,
    store: Arc<OrderStore>,
    clock: Arc<dyn Clock>,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        store: Arc<OrderStore>,
        clock: Arc<dyn Clock>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            gateway,
            store,
            clock,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Run ticks on the configured period until `shutdown` flips to `true`.
    ///
    /// Shutdown is observed between ticks and between orders within a tick.
    /// A submission already waiting for its receipt is allowed to finish.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.settings.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            tick_secs = self.settings.tick_interval.as_secs(),
            dry_run = self.settings.dry_run,
            "Scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let report = self.tick_until(Some(&shutdown)).await;
                    if report.interrupted {
                        break;
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }

    /// Run one tick over every tracked order.
    pub async fn tick(&self) -> TickReport {
        self.tick_until(None).await
    }

    async fn tick_until(&self, shutdown: Option<&watch::Receiver<bool>>) -> TickReport {
        let ids = self.store.snapshot();
        let mut report = TickReport {
            started_at: self.clock.now(),
            ..TickReport::default()
        };
        let mut gas = GasQuote::Unfetched;

        for id in ids {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                info!(order_id = %id, "Shutdown requested, ending tick early");
                report.interrupted = true;
                break;
            }

            let action = self.process(id, &mut gas).await;
            report.actions.push((id, action));
        }

        if !report.actions.is_empty() {
            info!(
                tracked = self.store.len(),
                visited = report.actions.len(),
                submitted = report.submitted(),
                removed = report.removed(),
                failed = report.failed(),
                "Tick complete"
            );
        }

        report
    }

    async fn process(&self, id: OrderId, gas: &mut GasQuote) -> TickAction {
        let order = match self.gateway.fetch_order(id).await {
            Ok(order) => order,
            Err(Error::Chain(ChainError::OrderNotFound(_))) => {
                warn!(order_id = %id, "Order not found on-chain, dropping");
                self.store.remove(id);
                return TickAction::Dropped;
            }
            Err(e) => {
                error!(order_id = %id, error = %e, "Failed to fetch order");
                return TickAction::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let now = self.clock.now();
        debug!(
            order_id = %id,
            slices_executed = order.slices_executed,
            total_slices = order.total_slices(),
            next_execution_time = order.next_execution_time,
            now,
            "Evaluating order"
        );

        if let Some(phase) = terminal_phase(&order, now) {
            self.store.remove(id);
            info!(
                order_id = %id,
                phase = %phase,
                slices_executed = order.slices_executed,
                total_slices = order.total_slices(),
                "Order no longer tracked"
            );
            return TickAction::Removed(phase);
        }

        if !order.is_due(now) {
            return TickAction::Waiting {
                due_in: order.due_in(now),
            };
        }

        if let Some(reason) = self.gas_guard(gas).await {
            match &reason {
                DeferReason::GasTooHigh { price, ceiling } => {
                    warn!(
                        order_id = %id,
                        gas_price = price,
                        ceiling,
                        "Gas price above ceiling, deferring slice"
                    );
                }
                DeferReason::GasPriceUnavailable => {
                    warn!(order_id = %id, "Gas price unavailable, deferring slice");
                }
            }
            return TickAction::Deferred(reason);
        }

        if self.settings.dry_run {
            info!(
                order_id = %id,
                slice = order.slices_executed + 1,
                total_slices = order.total_slices(),
                "Dry run: would execute slice"
            );
            return TickAction::DryRun;
        }

        self.submit(&order, gas).await
    }

    async fn submit(&self, order: &Order, gas: &mut GasQuote) -> TickAction {
        let id = order.id;
        info!(
            order_id = %id,
            slice = order.slices_executed + 1,
            total_slices = order.total_slices(),
            "Executing slice"
        );

        match self
            .gateway
            .execute_slice(id, self.settings.max_gas_price_wei)
            .await
        {
            Ok(receipt) => {
                info!(
                    order_id = %id,
                    tx_hash = %receipt.tx_hash,
                    gas_used = receipt.gas_used,
                    "Slice executed"
                );
                TickAction::Submitted(receipt)
            }
            Err(Error::Chain(ChainError::ExecutionReverted {
                tx_hash, reason, ..
            })) => {
                error!(
                    order_id = %id,
                    tx_hash = tx_hash.as_deref().unwrap_or("unknown"),
                    reason = %reason,
                    "Slice transaction reverted, will retry next tick"
                );
                TickAction::Reverted { reason }
            }
            Err(Error::Chain(ChainError::GasPriceAboveCeiling { price, ceiling })) => {
                warn!(
                    order_id = %id,
                    gas_price = price,
                    ceiling,
                    "Gas price rose above ceiling before signing, deferring slice"
                );
                *gas = GasQuote::Price(price);
                TickAction::Deferred(DeferReason::GasTooHigh { price, ceiling })
            }
            Err(e) => {
                error!(order_id = %id, error = %e, "Slice submission failed, will retry next tick");
                TickAction::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Returns a reason to hold back submissions, fetching the price lazily.
    async fn gas_guard(&self, gas: &mut GasQuote) -> Option<DeferReason> {
        let ceiling = self.settings.max_gas_price_wei?;

        if let GasQuote::Unfetched = gas {
            *gas = match self.gateway.gas_price().await {
                Ok(price) => GasQuote::Price(price),
                Err(e) => {
                    error!(error = %e, "Failed to read gas price");
                    GasQuote::Unavailable
                }
            };
        }

        match *gas {
            GasQuote::Price(price) if price > ceiling => {
                Some(DeferReason::GasTooHigh { price, ceiling })
            }
            GasQuote::Price(_) => None,
            GasQuote::Unavailable | GasQuote::Unfetched => Some(DeferReason::GasPriceUnavailable),
        }
    }
}

/// Terminal phase an order has reached at `now`, if any.
///
/// Completion is checked after expiry so that an order whose window closed is
/// reported as expired, and before the due check so that a finished order is
/// never submitted again.
fn terminal_phase(order: &Order, now: u64) -> Option<OrderPhase> {
    let phase = order.phase(now);
    phase.is_terminal().then_some(phase)
}
