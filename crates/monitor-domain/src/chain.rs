use std::time::Duration;

use crate::{ChainId, Contract};

/// One monitored network together with the contracts watched on it.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Chain {
    id: ChainId,
    rpc_endpoints: Vec<String>,
    poll_interval: Duration,
    confirmations: u64,
    max_block_range: u64,
    start_block: Option<u64>,
    contracts: Vec<Contract>,
}

impl Chain {
    pub fn new(
        id: ChainId,
        rpc_endpoints: Vec<String>,
        poll_interval: Duration,
        confirmations: u64,
        max_block_range: u64,
        start_block: Option<u64>,
        contracts: Vec<Contract>,
    ) -> Self {
        Self {
            id,
            rpc_endpoints,
            poll_interval,
            confirmations,
            max_block_range,
            start_block,
            contracts,
        }
    }

    pub fn id(&self) -> &ChainId {
        &self.id
    }

    pub fn rpc_endpoints(&self) -> &[String] {
        &self.rpc_endpoints
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Blocks kept behind the tip to avoid reading reorg-prone heads.
    pub fn confirmations(&self) -> u64 {
        self.confirmations
    }

    pub fn max_block_range(&self) -> u64 {
        self.max_block_range
    }

    pub fn start_block(&self) -> Option<u64> {
        self.start_block
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn contract_by_address(&self, address: alloy::primitives::Address) -> Option<&Contract> {
        self.contracts
            .iter()
            .find(|contract| contract.address() == address)
    }
}
