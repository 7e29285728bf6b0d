use alloy::{
    primitives::Address,
    providers::Provider,
    rpc::types::{Filter, Log},
};
use async_trait::async_trait;

use crate::{
    ChainId, LogSource,
    error::BlockchainError,
    provider::{ChainProvider, initialize_provider},
};

/// JSON-RPC client for one chain.
pub struct ChainClient {
    chain_id: ChainId,
    provider: ChainProvider,
}

impl ChainClient {
    /// Connects to the chain's RPC endpoints and verifies connectivity.
    pub async fn connect(
        chain_id: &ChainId,
        rpc_endpoints: &[String],
    ) -> Result<Self, BlockchainError> {
        let provider = initialize_provider(chain_id, rpc_endpoints).await?;
        Ok(Self {
            chain_id: chain_id.clone(),
            provider,
        })
    }
}

#[async_trait]
impl LogSource for ChainClient {
    fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    async fn block_number(&self) -> Result<u64, BlockchainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(BlockchainError::get_block_number)
    }

    async fn logs(
        &self,
        addresses: &[Address],
        from: u64,
        to: u64,
    ) -> Result<Vec<Log>, BlockchainError> {
        let filter = Filter::new()
            .address(addresses.to_vec())
            .from_block(from)
            .to_block(to);

        self.provider
            .get_logs(&filter)
            .await
            .map_err(BlockchainError::get_logs)
    }
}
