use std::path::PathBuf;

use monitor_domain::ChainId;
use serde::{Deserialize, Serialize};

/// One watched contract as it appears in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ContractConfigRaw {
    /// Human readable name, also used to name the contract's event table.
    pub name: String,
    /// Id of the chain the contract is deployed on.
    pub chain: ChainId,
    /// Hex encoded contract address.
    pub address: String,
    /// Path to the contract ABI JSON, relative to the config file directory.
    pub abi: PathBuf,
    /// Event names to forward. All ABI events are forwarded when omitted.
    #[serde(default)]
    pub events: Option<Vec<String>>,
}
