//! Builders for domain values used across tests.

use alloy_primitives::{Address, B256, U256};

use crate::domain::{Order, OrderCreated, OrderId};
use crate::port::StreamEvent;

/// Fluent builder for [`Order`] snapshots.
///
/// Defaults describe a fresh order starting at `t = 1000` with six slices,
/// one every 10 seconds. Unless set explicitly, `next_execution_time`
/// follows from `start + slices_executed * interval`, as the contract would
/// have left it.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    id: u64,
    start: u64,
    interval: u64,
    duration: u64,
    slices_executed: u64,
    next_execution_time: Option<u64>,
    total_amount: u64,
    cancelled: bool,
}

impl OrderBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            start: 1_000,
            interval: 10,
            duration: 60,
            slices_executed: 0,
            next_execution_time: None,
            total_amount: 6_000_000,
            cancelled: false,
        }
    }

    pub fn start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    pub fn interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    pub fn duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn slices_executed(mut self, slices: u64) -> Self {
        self.slices_executed = slices;
        self
    }

    pub fn next_execution_time(mut self, at: u64) -> Self {
        self.next_execution_time = Some(at);
        self
    }

    pub fn total_amount(mut self, amount: u64) -> Self {
        self.total_amount = amount;
        self
    }

    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn build(self) -> Order {
        let total_slices = if self.interval == 0 {
            0
        } else {
            self.duration / self.interval
        };
        let slice_size = if total_slices == 0 {
            0
        } else {
            self.total_amount / total_slices
        };
        let next_execution_time = self
            .next_execution_time
            .unwrap_or(self.start + self.slices_executed * self.interval);

        Order {
            id: OrderId::new(self.id),
            creator: Address::repeat_byte(0xc0),
            token_in: Address::repeat_byte(0x11),
            token_out: Address::repeat_byte(0x22),
            total_amount: U256::from(self.total_amount),
            interval: self.interval,
            duration: self.duration,
            slice_size: U256::from(slice_size),
            max_slippage_bps: U256::from(50u64),
            pool_fee: U256::from(3_000u64),
            start_time: self.start,
            slices_executed: self.slices_executed,
            next_execution_time,
            total_out: U256::from(slice_size * self.slices_executed),
            cancelled: self.cancelled,
        }
    }
}

/// An `OrderCreated` notification for `id` with fixed token fields.
pub fn order_created(id: u64) -> OrderCreated {
    OrderCreated {
        order_id: OrderId::new(id),
        creator: Address::repeat_byte(0xc0),
        token_in: Address::repeat_byte(0x11),
        token_out: Address::repeat_byte(0x22),
        total_amount: U256::from(6_000_000u64),
        duration: 60,
        interval: 10,
        slice_size: U256::from(1_000_000u64),
        block_number: Some(100 + id),
        transaction_hash: Some(B256::repeat_byte(0xab)),
    }
}

/// Create an [`OrderCreated`](StreamEvent::OrderCreated) stream event.
pub fn order_created_event(id: u64) -> StreamEvent {
    StreamEvent::OrderCreated(order_created(id))
}

/// Create a [`Disconnected`](StreamEvent::Disconnected) stream event.
pub fn disconnect_event(reason: &str) -> StreamEvent {
    StreamEvent::Disconnected {
        reason: reason.to_string(),
    }
}
