use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use monitor_blockchain::{Address, ChainConfig, JsonAbi};
use monitor_domain::{Chain, ChainId, Contract};

use super::{ContractConfigRaw, ContractLoadError};

/// Build the immutable chain set from resolved chain configs and raw contract
/// definitions. ABI paths are resolved against `config_dir`.
///
/// Contracts on chains that are not enabled are rejected, so a typo in a chain
/// id never silently drops a contract. Within a chain every contract needs its
/// own address and its own storage identifier, otherwise events would be
/// routed to the wrong contract or share a table.
pub(crate) fn load_chains(
    config_dir: &Path,
    chains: &[ChainConfig],
    contracts: &[ContractConfigRaw],
) -> Result<Vec<Chain>, ContractLoadError> {
    let mut by_chain: HashMap<&ChainId, Vec<Contract>> =
        chains.iter().map(|chain| (&chain.id, Vec::new())).collect();
    let mut seen = HashSet::new();
    let mut addresses: HashMap<(ChainId, Address), String> = HashMap::new();
    let mut storage_names: HashMap<(ChainId, String), String> = HashMap::new();

    for raw in contracts {
        let Some(bucket) = by_chain.get_mut(&raw.chain) else {
            return Err(ContractLoadError::UnknownChain {
                contract: raw.name.clone(),
                chain: raw.chain.clone(),
            });
        };
        if !seen.insert((raw.chain.clone(), raw.name.clone())) {
            return Err(ContractLoadError::DuplicateContract {
                contract: raw.name.clone(),
                chain: raw.chain.clone(),
            });
        }

        let contract = load_contract(config_dir, raw)?;
        let address_key = (raw.chain.clone(), contract.address());
        if let Some(first) = addresses.insert(address_key, raw.name.clone()) {
            return Err(ContractLoadError::DuplicateAddress {
                first,
                second: raw.name.clone(),
                address: contract.address(),
                chain: raw.chain.clone(),
            });
        }
        let identifier = contract.storage_identifier();
        let storage_key = (raw.chain.clone(), identifier.clone());
        if let Some(first) = storage_names.insert(storage_key, raw.name.clone()) {
            return Err(ContractLoadError::StorageNameCollision {
                first,
                second: raw.name.clone(),
                identifier,
                chain: raw.chain.clone(),
            });
        }

        bucket.push(contract);
    }

    let chains = chains
        .iter()
        .map(|config| {
            let contracts = by_chain.remove(&config.id).unwrap_or_default();
            if contracts.is_empty() {
                tracing::warn!(chain_id = %config.id, "Chain has no contracts configured");
            }
            Chain::new(
                config.id.clone(),
                config.rpc_endpoints.clone(),
                config.poll_interval,
                config.confirmations,
                config.max_block_range,
                config.start_block,
                contracts,
            )
        })
        .collect();

    Ok(chains)
}

fn load_contract(config_dir: &Path, raw: &ContractConfigRaw) -> Result<Contract, ContractLoadError> {
    let address = raw
        .address
        .parse::<Address>()
        .map_err(|error| ContractLoadError::InvalidAddress {
            contract: raw.name.clone(),
            address: raw.address.clone(),
            reason: error.to_string(),
        })?;

    let path = config_dir.join(&raw.abi);
    let contents = std::fs::read_to_string(&path).map_err(|source| ContractLoadError::ReadAbi {
        contract: raw.name.clone(),
        path: path.clone(),
        source,
    })?;
    let abi = parse_abi(&contents).map_err(|source| ContractLoadError::ParseAbi {
        contract: raw.name.clone(),
        path: path.clone(),
        source,
    })?;

    if let Some(events) = &raw.events {
        if let Some(event) = events.iter().find(|name| !abi.events.contains_key(*name)) {
            return Err(ContractLoadError::UnknownEvent {
                contract: raw.name.clone(),
                event: event.clone(),
            });
        }
    }

    tracing::debug!(
        contract = %raw.name,
        chain_id = %raw.chain,
        address = %address,
        events = abi.events.len(),
        "Loaded contract"
    );

    Ok(Contract::new(
        raw.name.clone(),
        raw.chain.clone(),
        address,
        abi,
        raw.events.clone(),
    ))
}

/// Accepts either a bare ABI array or a build artifact with an `abi` field.
fn parse_abi(contents: &str) -> Result<JsonAbi, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(contents)?;
    match value {
        serde_json::Value::Object(mut artifact) if artifact.contains_key("abi") => {
            serde_json::from_value(artifact.remove("abi").unwrap_or_default())
        }
        other => serde_json::from_value(other),
    }
}
