//! RPC retry and timeout configuration.

use std::time::Duration;

use serde::Deserialize;

/// Bounds for read calls against the node.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Total attempts per read, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry (milliseconds). Doubles per attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound on the retry delay (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Per-request timeout (seconds).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Most blocks spanned by one `eth_getLogs` request. Hosted nodes reject
    /// wide ranges, so a lagging watcher catches up in windows of this size.
    #[serde(default = "default_max_log_range")]
    pub max_log_range: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    2_000
}

const fn default_max_delay_ms() -> u64 {
    30_000
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_log_range() -> u64 {
    2_000
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            max_log_range: default_max_log_range(),
        }
    }
}

impl RpcConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
