use monitor_domain::{Chain, Contract};
use serde::Serialize;

#[derive(Serialize)]
pub(crate) struct ChainsResponse {
    pub chains: Vec<ChainDto>,
}

/// RPC endpoints are left out on purpose; they often embed API keys.
#[derive(Serialize)]
pub(crate) struct ChainDto {
    pub id: String,
    pub poll_interval_ms: u64,
    pub confirmations: u64,
    pub start_block: Option<u64>,
    pub contracts: Vec<ContractDto>,
}

#[derive(Serialize)]
pub(crate) struct ContractDto {
    pub name: String,
    pub address: String,
    pub events: Vec<String>,
}

impl From<&Chain> for ChainDto {
    fn from(chain: &Chain) -> Self {
        Self {
            id: chain.id().to_string(),
            poll_interval_ms: chain.poll_interval().as_millis() as u64,
            confirmations: chain.confirmations(),
            start_block: chain.start_block(),
            contracts: chain.contracts().iter().map(ContractDto::from).collect(),
        }
    }
}

impl From<&Contract> for ContractDto {
    fn from(contract: &Contract) -> Self {
        let mut events = contract.watched_event_names();
        events.sort();
        Self {
            name: contract.name().to_string(),
            address: contract.address().to_checksum(None),
            events,
        }
    }
}
