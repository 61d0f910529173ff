//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all keeper settings.
//! Configuration is loaded from a TOML file; the signing key only ever comes
//! from the `KEEPER_PRIVATE_KEY` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use twap_keeper::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::chain::ChainConfig;
use super::keeper::KeeperConfig;
use super::logging::LoggingConfig;
use super::reconnection::ReconnectionConfig;
use super::rpc::RpcConfig;
use crate::error::{ConfigError, Result};

/// Environment variable holding the hex-encoded signing key.
pub const PRIVATE_KEY_ENV: &str = "KEEPER_PRIVATE_KEY";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Evaluate orders and log the slices that would be sent, without sending.
    #[serde(default)]
    pub dry_run: bool,

    /// Node endpoint and contract address.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Tick period, gas ceiling and transaction settings.
    #[serde(default)]
    pub keeper: KeeperConfig,

    /// Retry and timeout bounds for read calls.
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Event feed backoff and circuit breaker.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Signing key, loaded from `KEEPER_PRIVATE_KEY` (never from the file).
    #[serde(skip)]
    pub private_key: Option<String>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the private key from the `KEEPER_PRIVATE_KEY` environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let key = std::env::var(PRIVATE_KEY_ENV).ok();
        Self::parse_toml_with_key(content, key)
    }

    /// Parse configuration from TOML content with an explicit signing key.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_key(content: &str, private_key: Option<String>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.private_key = private_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Call again after applying command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        self.chain.rpc_endpoint()?;
        self.chain.contract()?;

        if self.keeper.tick_interval_secs == 0 {
            return Err(invalid("tick_interval_secs", "must be greater than 0"));
        }
        if self.keeper.event_poll_interval_secs == 0 {
            return Err(invalid("event_poll_interval_secs", "must be greater than 0"));
        }
        if let Some(ceiling) = self.keeper.max_gas_price_gwei {
            if ceiling < Decimal::ZERO {
                return Err(invalid("max_gas_price_gwei", "must be 0 or greater"));
            }
            if self.keeper.max_gas_price_wei().is_none() {
                return Err(invalid("max_gas_price_gwei", "value is too large"));
            }
        }
        if self.keeper.gas_limit == 0 {
            return Err(invalid("gas_limit", "must be greater than 0"));
        }
        if self.keeper.confirmation_timeout_secs == 0 {
            return Err(invalid("confirmation_timeout_secs", "must be greater than 0"));
        }

        if self.rpc.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be greater than 0"));
        }
        if self.rpc.base_delay_ms == 0 {
            return Err(invalid("base_delay_ms", "must be greater than 0"));
        }
        if self.rpc.max_delay_ms < self.rpc.base_delay_ms {
            return Err(invalid("max_delay_ms", "must be >= base_delay_ms"));
        }
        if self.rpc.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be greater than 0"));
        }
        if self.rpc.max_log_range == 0 {
            return Err(invalid("max_log_range", "must be greater than 0"));
        }

        if self.reconnection.initial_delay_ms == 0 {
            return Err(invalid("initial_delay_ms", "must be greater than 0"));
        }
        if self.reconnection.max_delay_ms < self.reconnection.initial_delay_ms {
            return Err(invalid("max_delay_ms", "must be >= initial_delay_ms"));
        }
        if self.reconnection.backoff_multiplier < 1.0 {
            return Err(invalid("backoff_multiplier", "must be >= 1.0"));
        }
        if self.reconnection.max_consecutive_failures == 0 {
            return Err(invalid("max_consecutive_failures", "must be greater than 0"));
        }
        if self.reconnection.circuit_breaker_cooldown_ms == 0 {
            return Err(invalid("circuit_breaker_cooldown_ms", "must be greater than 0"));
        }

        Ok(())
    }

    /// The signing key, required for sending slice transactions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when `KEEPER_PRIVATE_KEY` is unset.
    #[allow(clippy::result_large_err)]
    pub fn signing_key(&self) -> Result<&str> {
        self.private_key.as_deref().ok_or_else(|| {
            ConfigError::MissingField {
                field: PRIVATE_KEY_ENV,
            }
            .into()
        })
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
