use alloy::{json_abi::JsonAbi, primitives::Address};

use crate::{ChainId, storage_identifier};

/// A contract whose logs are watched on exactly one chain.
#[derive(Debug, Clone)]
pub struct Contract {
    name: String,
    chain_id: ChainId,
    address: Address,
    abi: JsonAbi,
    /// Event names to keep. `None` keeps every log emitted by the contract.
    events: Option<Vec<String>>,
}

impl Contract {
    pub fn new(
        name: impl Into<String>,
        chain_id: ChainId,
        address: Address,
        abi: JsonAbi,
        events: Option<Vec<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            chain_id,
            address,
            abi,
            events,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Whether an event with this name passes the configured filter.
    pub fn watches(&self, event_name: &str) -> bool {
        self.events
            .as_ref()
            .is_none_or(|names| names.iter().any(|name| name == event_name))
    }

    /// Names of every ABI event this contract forwards.
    pub fn watched_event_names(&self) -> Vec<String> {
        match &self.events {
            Some(names) => names.clone(),
            None => self.abi.events.keys().cloned().collect(),
        }
    }

    pub fn storage_identifier(&self) -> String {
        storage_identifier(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(events: Option<Vec<String>>) -> Contract {
        Contract::new(
            "Token",
            ChainId::from("ethereum"),
            Address::ZERO,
            JsonAbi::new(),
            events,
        )
    }

    #[test]
    fn unfiltered_contract_watches_everything() {
        assert!(contract(None).watches("Transfer"));
    }

    #[test]
    fn filtered_contract_only_watches_listed_events() {
        let contract = contract(Some(vec!["Transfer".to_string()]));
        assert!(contract.watches("Transfer"));
        assert!(!contract.watches("Approval"));
    }
}
