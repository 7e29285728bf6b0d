use std::time::Duration;

use monitor_domain::ChainId;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 12_000;
pub const DEFAULT_CONFIRMATIONS: u64 = 2;
pub const DEFAULT_MAX_BLOCK_RANGE: u64 = 500;

/// Configuration for one monitored network as it appears in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfigRaw {
    /// Disabled chains are dropped during resolution.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Unique identifier, referenced by contracts (e.g. "ethereum", "polygon:137").
    pub id: ChainId,

    /// JSON-RPC endpoints (HTTP or WebSocket). Extra endpoints act as fallbacks.
    #[serde(default)]
    pub rpc_endpoints: Vec<String>,

    /// Delay between two polls for new logs.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of blocks kept behind the chain tip.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    /// Maximum block span of a single `eth_getLogs` request.
    #[serde(default = "default_max_block_range")]
    pub max_block_range: u64,

    /// First block to scan. Defaults to the confirmed tip at startup.
    #[serde(default)]
    pub start_block: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_confirmations() -> u64 {
    DEFAULT_CONFIRMATIONS
}

fn default_max_block_range() -> u64 {
    DEFAULT_MAX_BLOCK_RANGE
}

impl ChainConfigRaw {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Ensures at least one RPC endpoint is configured.
    pub fn ensure_rpc_endpoints(&self) -> Result<(), ConfigError> {
        if self.rpc_endpoints.is_empty() {
            return Err(ConfigError::InvalidConfig(format!(
                "chain '{}': rpc_endpoints must include at least one endpoint",
                self.id
            )));
        }
        Ok(())
    }

    pub fn resolve(self) -> Result<ChainConfig, ConfigError> {
        self.ensure_rpc_endpoints()?;

        if self.id.as_str().trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "chain id must not be empty".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(format!(
                "chain '{}': poll_interval_ms must be greater than 0",
                self.id
            )));
        }
        if self.max_block_range == 0 {
            return Err(ConfigError::InvalidConfig(format!(
                "chain '{}': max_block_range must be greater than 0",
                self.id
            )));
        }

        Ok(ChainConfig {
            id: self.id,
            rpc_endpoints: self.rpc_endpoints,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            confirmations: self.confirmations,
            max_block_range: self.max_block_range,
            start_block: self.start_block,
        })
    }
}

/// Validated chain configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub id: ChainId,
    pub rpc_endpoints: Vec<String>,
    pub poll_interval: Duration,
    pub confirmations: u64,
    pub max_block_range: u64,
    pub start_block: Option<u64>,
}
