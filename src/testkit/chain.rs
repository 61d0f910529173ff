//! In-memory [`ChainGateway`] and a manually driven [`Clock`].
//!
//! [`MockChain`] behaves like the order contract: `execute_slice` advances
//! `slices_executed`, `next_execution_time` and `total_out` exactly as the
//! contract would, so a restarted keeper can be pointed at the same mock and
//! observe post-slice state.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Order, OrderId};
use crate::error::{ChainError, Result};
use crate::port::{ChainGateway, Clock, NodeStatus, SliceReceipt};

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// MockChain
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ChainState {
    orders: BTreeMap<OrderId, Order>,
    order_count: Option<u64>,
    offline: bool,
    failing_fetches: HashSet<OrderId>,
    reverting: HashSet<OrderId>,
    gas_price: u128,
    signing_gas_price: Option<u128>,
    gas_price_fails: bool,
    gas_price_reads: u32,
    submissions: HashMap<OrderId, u32>,
    tx_nonce: u64,
    node: Option<NodeStatus>,
}

/// Scriptable stand-in for the order contract.
pub struct MockChain {
    state: Mutex<ChainState>,
    clock: Option<Arc<dyn Clock>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ChainState {
                gas_price: 1_000_000_000,
                ..ChainState::default()
            }),
            clock: None,
        }
    }

    /// Reject slices that are not yet due according to `clock`, the way the
    /// contract checks `block.timestamp`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Add or replace an order.
    pub fn insert(&self, order: Order) {
        self.state.lock().orders.insert(order.id, order);
    }

    /// Current stored state of an order.
    pub fn order(&self, id: OrderId) -> Option<Order> {
        self.state.lock().orders.get(&id).cloned()
    }

    pub fn cancel(&self, id: OrderId) {
        if let Some(order) = self.state.lock().orders.get_mut(&id) {
            order.cancelled = true;
        }
    }

    /// Override `nextOrderId`. Defaults to one past the highest inserted id.
    pub fn set_order_count(&self, count: u64) {
        self.state.lock().order_count = Some(count);
    }

    /// Make every call fail as if the node were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Make `fetch_order(id)` fail with a transport outage.
    pub fn fail_fetches(&self, id: OrderId) {
        self.state.lock().failing_fetches.insert(id);
    }

    /// Make `execute_slice(id)` mine with failure status.
    pub fn revert_slices(&self, id: OrderId) {
        self.state.lock().reverting.insert(id);
    }

    pub fn clear_reverts(&self) {
        self.state.lock().reverting.clear();
    }

    pub fn set_gas_price(&self, wei: u128) {
        self.state.lock().gas_price = wei;
    }

    /// Gas price seen when a slice is signed, if it differs from the quote
    /// returned by `gas_price`.
    pub fn set_signing_gas_price(&self, wei: u128) {
        self.state.lock().signing_gas_price = Some(wei);
    }

    pub fn fail_gas_price(&self, fail: bool) {
        self.state.lock().gas_price_fails = fail;
    }

    pub fn set_node_status(&self, status: NodeStatus) {
        self.state.lock().node = Some(status);
    }

    /// How many times `gas_price` was called.
    pub fn gas_price_reads(&self) -> u32 {
        self.state.lock().gas_price_reads
    }

    /// How many `execute_slice` calls were made for `id`, reverted or not.
    pub fn submissions(&self, id: OrderId) -> u32 {
        self.state.lock().submissions.get(&id).copied().unwrap_or(0)
    }

    pub fn total_submissions(&self) -> u32 {
        self.state.lock().submissions.values().sum()
    }

    fn outage(operation: &'static str) -> ChainError {
        ChainError::Unavailable {
            operation,
            attempts: 1,
            reason: "mock chain offline".into(),
        }
    }
}

#[async_trait]
impl ChainGateway for MockChain {
    async fn fetch_order(&self, id: OrderId) -> Result<Order> {
        let state = self.state.lock();
        if state.offline || state.failing_fetches.contains(&id) {
            return Err(Self::outage("getOrder").into());
        }
        state
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| ChainError::OrderNotFound(id).into())
    }

    async fn order_count(&self) -> Result<u64> {
        let state = self.state.lock();
        if state.offline {
            return Err(Self::outage("nextOrderId").into());
        }
        let derived = state
            .orders
            .keys()
            .next_back()
            .map_or(0, |id| id.value() + 1);
        Ok(state.order_count.unwrap_or(derived))
    }

    async fn gas_price(&self) -> Result<u128> {
        let mut state = self.state.lock();
        state.gas_price_reads += 1;
        if state.offline || state.gas_price_fails {
            return Err(Self::outage("eth_gasPrice").into());
        }
        Ok(state.gas_price)
    }

    async fn execute_slice(
        &self,
        id: OrderId,
        max_gas_price: Option<u128>,
    ) -> Result<SliceReceipt> {
        let now = self.clock.as_ref().map(|clock| clock.now());
        let mut state = self.state.lock();
        if state.offline {
            return Err(Self::outage("executeSlice").into());
        }

        let price = state.signing_gas_price.unwrap_or(state.gas_price);
        if let Some(ceiling) = max_gas_price.filter(|ceiling| price > *ceiling) {
            return Err(ChainError::GasPriceAboveCeiling { price, ceiling }.into());
        }

        *state.submissions.entry(id).or_default() += 1;
        state.tx_nonce += 1;
        let tx_hash = format!("0x{:064x}", state.tx_nonce);

        let revert = |reason: &str| -> Result<SliceReceipt> {
            Err(ChainError::ExecutionReverted {
                order_id: id,
                tx_hash: Some(tx_hash.clone()),
                reason: reason.to_string(),
            }
            .into())
        };

        if state.reverting.contains(&id) {
            return revert("transaction mined with status 0");
        }
        let Some(order) = state.orders.get_mut(&id) else {
            return revert("order does not exist");
        };
        if order.cancelled {
            return revert("order cancelled");
        }
        if order.slices_executed >= order.total_slices() {
            return revert("order complete");
        }
        if now.is_some_and(|now| now < order.next_execution_time) {
            return revert("too early");
        }

        order.slices_executed += 1;
        order.next_execution_time += order.interval;
        order.total_out += order.slice_size;

        Ok(SliceReceipt {
            tx_hash,
            gas_used: 180_000,
            block_number: Some(state.tx_nonce),
        })
    }

    async fn node_status(&self) -> Result<NodeStatus> {
        let state = self.state.lock();
        if state.offline {
            return Err(Self::outage("eth_chainId").into());
        }
        Ok(state.node.clone().unwrap_or(NodeStatus {
            chain_id: 31_337,
            latest_block: 1,
            latest_block_timestamp: self.clock.as_ref().map_or(0, |clock| clock.now()),
        }))
    }

    fn signer_address(&self) -> Option<String> {
        Some("0x00000000000000000000000000000000000000aa".to_string())
    }

    fn chain_name(&self) -> &'static str {
        "mock"
    }
}
