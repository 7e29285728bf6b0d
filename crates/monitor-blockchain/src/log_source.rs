use std::time::Instant;

use alloy::{primitives::Address, rpc::types::Log};
use async_trait::async_trait;

use crate::{ChainId, error::BlockchainError};

/// Read access to a chain's blocks and logs.
#[async_trait]
pub trait LogSource: Send + Sync {
    fn chain_id(&self) -> &ChainId;

    async fn block_number(&self) -> Result<u64, BlockchainError>;

    /// Logs emitted by any of `addresses` in the inclusive range `from..=to`.
    async fn logs(
        &self,
        addresses: &[Address],
        from: u64,
        to: u64,
    ) -> Result<Vec<Log>, BlockchainError>;
}

/// Fetch logs for `from..=to`, splitting the range into requests of at most
/// `max_block_range` blocks. Stops at the first failing request.
pub async fn fetch_logs_in_chunks<S: LogSource + ?Sized>(
    source: &S,
    addresses: &[Address],
    from: u64,
    to: u64,
    max_block_range: u64,
) -> Result<Vec<Log>, BlockchainError> {
    let max_block_range = max_block_range.max(1);
    let mut all_logs = Vec::new();

    let mut block = from;
    while block <= to {
        let chunk_end = block.saturating_add(max_block_range - 1).min(to);
        let block_span = (chunk_end - block + 1) as usize;
        let started = Instant::now();

        match source.logs(addresses, block, chunk_end).await {
            Ok(logs) => {
                monitor_observability::record_chain_logs_batch(
                    source.chain_id().as_str(),
                    "all",
                    "ok",
                    started.elapsed(),
                    block_span,
                    logs.len(),
                );
                all_logs.extend(logs);
            }
            Err(error) => {
                monitor_observability::record_chain_logs_batch(
                    source.chain_id().as_str(),
                    "all",
                    "error",
                    started.elapsed(),
                    block_span,
                    0,
                );
                return Err(error);
            }
        }

        if chunk_end == u64::MAX {
            break;
        }
        block = chunk_end + 1;
    }

    Ok(all_logs)
}
