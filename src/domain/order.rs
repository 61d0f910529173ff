//! TWAP order state as read from the contract.
//!
//! An [`Order`] is a snapshot of the contract's `getOrder` tuple. The keeper
//! never mutates it; the contract advances `slices_executed`,
//! `next_execution_time` and `total_out` on every executed slice, so all
//! lifecycle decisions are re-derived from a fresh snapshot.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::Serialize;

use super::id::OrderId;

/// Snapshot of one TWAP order.
///
/// Field order mirrors the contract tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub creator: Address,
    pub token_in: Address,
    pub token_out: Address,
    /// Total input amount in base units, fixed at creation.
    pub total_amount: U256,
    /// Seconds between slices.
    pub interval: u64,
    /// Seconds the order runs for, measured from `start_time`.
    pub duration: u64,
    pub slice_size: U256,
    /// Passed through to the contract, not interpreted locally.
    pub max_slippage_bps: U256,
    /// Passed through to the contract, not interpreted locally.
    pub pool_fee: U256,
    /// Unix timestamp.
    pub start_time: u64,
    pub slices_executed: u64,
    /// Unix timestamp after which the next slice may execute.
    pub next_execution_time: u64,
    pub total_out: U256,
    pub cancelled: bool,
}

/// Lifecycle phase derived from an order snapshot and the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPhase {
    /// No slice has executed yet.
    PendingFirstSlice,
    /// At least one slice has executed and more remain.
    Executing,
    /// All slices executed.
    Completed,
    /// The order window closed before all slices executed.
    Expired,
    /// Cancelled on-chain.
    Cancelled,
}

impl OrderPhase {
    /// Terminal phases never transition again; the keeper stops tracking them.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired | Self::Cancelled)
    }

    /// Stable name used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingFirstSlice => "pending_first_slice",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Order {
    /// Total number of slices this order executes.
    ///
    /// Floor division: a trailing partial interval is never scheduled. An
    /// order with a zero interval has no slices.
    #[must_use]
    pub const fn total_slices(&self) -> u64 {
        if self.interval == 0 {
            return 0;
        }
        self.duration / self.interval
    }

    /// Slices still to execute.
    #[must_use]
    pub const fn remaining_slices(&self) -> u64 {
        self.total_slices().saturating_sub(self.slices_executed)
    }

    /// Unix timestamp at which the order window closes.
    #[must_use]
    pub const fn end_time(&self) -> u64 {
        self.start_time.saturating_add(self.duration)
    }

    /// The window is closed once `now` is strictly past `start_time + duration`.
    #[must_use]
    pub const fn is_expired(&self, now: u64) -> bool {
        now > self.end_time()
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.slices_executed >= self.total_slices()
    }

    /// Whether the contract's next execution time has been reached.
    #[must_use]
    pub const fn is_due(&self, now: u64) -> bool {
        now >= self.next_execution_time
    }

    /// Seconds until the next slice is due, zero if already due.
    #[must_use]
    pub const fn due_in(&self, now: u64) -> u64 {
        self.next_execution_time.saturating_sub(now)
    }

    /// Whether the keeper should track this order.
    ///
    /// Holds iff the order is not cancelled, has slices remaining and its
    /// window has not closed.
    #[must_use]
    pub const fn is_trackable(&self, now: u64) -> bool {
        !self.cancelled && !self.is_complete() && !self.is_expired(now)
    }

    /// Derive the lifecycle phase at `now`.
    ///
    /// Precedence is cancelled, then expired, then completed: an order past its
    /// window is expired regardless of how many slices ran.
    #[must_use]
    pub const fn phase(&self, now: u64) -> OrderPhase {
        if self.cancelled {
            OrderPhase::Cancelled
        } else if self.is_expired(now) {
            OrderPhase::Expired
        } else if self.is_complete() {
            OrderPhase::Completed
        } else if self.slices_executed == 0 {
            OrderPhase::PendingFirstSlice
        } else {
            OrderPhase::Executing
        }
    }
}
