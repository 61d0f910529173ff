//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::time::Duration;

use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::infrastructure::retry::RetryPolicy;

/// Fast reconnection config with zero delays, so tests never wait.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: 3,
        circuit_breaker_cooldown_ms: 0,
    }
}

/// Retry policy with millisecond delays and a short per-call timeout.
pub fn retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(
        max_attempts,
        Duration::from_millis(1),
        Duration::from_millis(5),
        Duration::from_millis(200),
    )
}

/// Minimal valid TOML configuration pointing at a local node.
pub fn minimal_toml() -> &'static str {
    r#"
[chain]
rpc_url = "http://127.0.0.1:8545"
contract_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
"#
}
