use std::path::PathBuf;

use monitor_blockchain::Address;
use monitor_domain::ChainId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractLoadError {
    #[error("contract '{contract}' references unknown chain '{chain}'")]
    UnknownChain { contract: String, chain: ChainId },

    #[error("contract '{contract}' is declared twice on chain '{chain}'")]
    DuplicateContract { contract: String, chain: ChainId },

    #[error("contracts '{first}' and '{second}' share address {address} on chain '{chain}'")]
    DuplicateAddress {
        first: String,
        second: String,
        address: Address,
        chain: ChainId,
    },

    #[error(
        "contracts '{first}' and '{second}' on chain '{chain}' both store events as '{identifier}'"
    )]
    StorageNameCollision {
        first: String,
        second: String,
        identifier: String,
        chain: ChainId,
    },

    #[error("contract '{contract}': invalid address '{address}': {reason}")]
    InvalidAddress {
        contract: String,
        address: String,
        reason: String,
    },

    #[error("contract '{contract}': failed to read ABI {}: {source}", path.display())]
    ReadAbi {
        contract: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("contract '{contract}': failed to parse ABI {}: {source}", path.display())]
    ParseAbi {
        contract: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("contract '{contract}': event '{event}' is not declared in its ABI")]
    UnknownEvent { contract: String, event: String },
}
