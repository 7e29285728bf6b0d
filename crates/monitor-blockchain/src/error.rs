use alloy::transports::{RpcError, TransportErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("RPC connection failed after trying {attempts} endpoint(s)")]
    RpcConnectionFailed { attempts: usize },

    #[error("Failed to get logs: {reason}")]
    GetLogs {
        reason: String,
        #[source]
        source: Option<RpcError<TransportErrorKind>>,
    },

    #[error("Failed to get block number: {reason}")]
    GetBlockNumber {
        reason: String,
        #[source]
        source: Option<RpcError<TransportErrorKind>>,
    },
}

impl BlockchainError {
    pub fn get_logs(source: RpcError<TransportErrorKind>) -> Self {
        Self::GetLogs {
            reason: source.to_string(),
            source: Some(source),
        }
    }

    pub fn get_block_number(source: RpcError<TransportErrorKind>) -> Self {
        Self::GetBlockNumber {
            reason: source.to_string(),
            source: Some(source),
        }
    }
}
