//! Chain endpoint and contract configuration.

use std::str::FromStr;

use alloy_primitives::Address;
use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Result};

const RPC_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// Where the order contract lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the node.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Address of the TWAP order contract.
    #[serde(default)]
    pub contract_address: String,
    /// Expected chain id. Checked against the node at startup when set.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            contract_address: String::new(),
            chain_id: None,
        }
    }
}

impl ChainConfig {
    /// Parsed RPC endpoint.
    ///
    /// # Errors
    ///
    /// Fails on an empty URL, an unparseable URL or an unsupported scheme.
    #[allow(clippy::result_large_err)]
    pub fn rpc_endpoint(&self) -> Result<Url> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" }.into());
        }
        let url = Url::parse(self.rpc_url.trim()).map_err(|e| ConfigError::InvalidValue {
            field: "rpc_url",
            reason: e.to_string(),
        })?;
        if !RPC_SCHEMES.contains(&url.scheme()) {
            return Err(ConfigError::InvalidValue {
                field: "rpc_url",
                reason: format!(
                    "unsupported scheme '{}', expected one of http, https, ws, wss",
                    url.scheme()
                ),
            }
            .into());
        }
        Ok(url)
    }

    /// Parsed contract address.
    ///
    /// # Errors
    ///
    /// Fails if the address is missing or not 20 bytes of hex.
    #[allow(clippy::result_large_err)]
    pub fn contract(&self) -> Result<Address> {
        let raw = self.contract_address.trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingField {
                field: "contract_address",
            }
            .into());
        }
        Address::from_str(raw).map_err(|e| {
            ConfigError::InvalidValue {
                field: "contract_address",
                reason: e.to_string(),
            }
            .into()
        })
    }
}
