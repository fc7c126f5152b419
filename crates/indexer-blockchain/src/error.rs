use alloy::transports::{RpcError, TransportErrorKind};

use crate::rpc_executor::GovernorError;

#[derive(Debug, thiserror::Error)]
pub enum BlockchainError {
    #[error("Chain reader is not connected")]
    NotConnected,

    #[error("No RPC endpoints configured")]
    NoEndpoints,

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

    #[error(transparent)]
    Governor(#[from] GovernorError),
}

impl BlockchainError {
    /// Create a GetLogs error with the underlying RPC error
    pub(crate) fn get_logs(err: RpcError<TransportErrorKind>) -> Self {
        Self::GetLogs {
            reason: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a GetBlockNumber error with the underlying RPC error
    pub(crate) fn get_block_number(err: RpcError<TransportErrorKind>) -> Self {
        Self::GetBlockNumber {
            reason: err.to_string(),
            source: Some(err),
        }
    }
}
