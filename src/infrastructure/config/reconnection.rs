//! Event feed reconnection configuration.

use serde::Deserialize;

/// Backoff and circuit breaker settings for the event subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Delay before the first resubscription attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Consecutive failed resubscriptions before the breaker opens.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// How long the open breaker blocks attempts (milliseconds).
    #[serde(default = "default_circuit_breaker_cooldown_ms")]
    pub circuit_breaker_cooldown_ms: u64,
}

const fn default_initial_delay_ms() -> u64 {
    1_000
}

const fn default_max_delay_ms() -> u64 {
    60_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_max_consecutive_failures() -> u32 {
    10
}

const fn default_circuit_breaker_cooldown_ms() -> u64 {
    300_000
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
            circuit_breaker_cooldown_ms: default_circuit_breaker_cooldown_ms(),
        }
    }
}
