use serde::{Deserialize, Serialize};

use crate::storage_identifier;

/// Unique identifier for a monitored network.
///
/// Free-form, e.g. "ethereum", "polygon:137" or "hardhat:31337".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the numeric EVM chain ID from a "name:chainid" identifier.
    pub fn evm_chain_id(&self) -> Option<u64> {
        self.0.split(':').nth(1).and_then(|s| s.parse().ok())
    }

    /// Identifier usable as a database schema or table prefix.
    pub fn storage_identifier(&self) -> String {
        storage_identifier(&self.0)
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
