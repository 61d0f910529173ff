//! Scheduling, gas and transaction settings.

use std::time::Duration;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Keeper loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct KeeperConfig {
    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Seconds between `OrderCreated` log polls.
    #[serde(default = "default_event_poll_interval_secs")]
    pub event_poll_interval_secs: u64,
    /// Seconds to wait before resubscribing after the event feed breaks.
    #[serde(default = "default_resubscribe_delay_secs")]
    pub resubscribe_delay_secs: u64,
    /// Skip slices while the network gas price is above this (gwei).
    #[serde(default = "default_max_gas_price_gwei")]
    pub max_gas_price_gwei: Option<Decimal>,
    /// Gas limit for each `executeSlice` transaction.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Blocks to wait for before a slice receipt counts as final.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Seconds to wait for a slice receipt before giving up on it.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    /// Warn at startup when the head block is older than this.
    #[serde(default = "default_stale_block_warn_secs")]
    pub stale_block_warn_secs: u64,
}

const fn default_tick_interval_secs() -> u64 {
    10
}

const fn default_event_poll_interval_secs() -> u64 {
    2
}

const fn default_resubscribe_delay_secs() -> u64 {
    5
}

fn default_max_gas_price_gwei() -> Option<Decimal> {
    Some(Decimal::from(50))
}

const fn default_gas_limit() -> u64 {
    300_000
}

const fn default_confirmations() -> u64 {
    1
}

const fn default_confirmation_timeout_secs() -> u64 {
    120
}

const fn default_stale_block_warn_secs() -> u64 {
    900
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            event_poll_interval_secs: default_event_poll_interval_secs(),
            resubscribe_delay_secs: default_resubscribe_delay_secs(),
            max_gas_price_gwei: default_max_gas_price_gwei(),
            gas_limit: default_gas_limit(),
            confirmations: default_confirmations(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            stale_block_warn_secs: default_stale_block_warn_secs(),
        }
    }
}

impl KeeperConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    #[must_use]
    pub const fn event_poll_interval(&self) -> Duration {
        Duration::from_secs(self.event_poll_interval_secs)
    }

    #[must_use]
    pub const fn resubscribe_delay(&self) -> Duration {
        Duration::from_secs(self.resubscribe_delay_secs)
    }

    #[must_use]
    pub const fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    #[must_use]
    pub const fn stale_block_warn(&self) -> Duration {
        Duration::from_secs(self.stale_block_warn_secs)
    }

    /// Gas ceiling in wei, fractional wei truncated.
    ///
    /// `None` when no ceiling is configured or the value does not fit.
    #[must_use]
    pub fn max_gas_price_wei(&self) -> Option<u128> {
        gwei_to_wei(self.max_gas_price_gwei?)
    }
}

/// Convert a gwei amount to wei, truncating fractional wei.
#[must_use]
pub fn gwei_to_wei(gwei: Decimal) -> Option<u128> {
    gwei.checked_mul(Decimal::from(WEI_PER_GWEI))?
        .trunc()
        .to_u128()
}
