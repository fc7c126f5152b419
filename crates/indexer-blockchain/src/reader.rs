use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use indexer_domain::RawEventLog;

use crate::error::BlockchainError;

/// Which logs a [`ChainReader::get_logs`] call returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Emitting contracts. Empty matches any address.
    pub addresses: Vec<Address>,
    /// Accepted topic0 values, OR-ed. Empty matches any event.
    pub topics: Vec<B256>,
}

impl LogFilter {
    pub fn new(addresses: Vec<Address>, topics: Vec<B256>) -> Self {
        Self { addresses, topics }
    }
}

/// Read-only view of the chain used by the sync engine.
///
/// Every call except `connect`/`close`/`is_connected` fails with
/// [`BlockchainError::NotConnected`] until `connect` has succeeded.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn connect(&self) -> Result<(), BlockchainError>;

    async fn close(&self);

    async fn is_connected(&self) -> bool;

    /// Latest block number known to the active endpoint.
    async fn current_height(&self) -> Result<u64, BlockchainError>;

    /// Logs in the inclusive range `[from_block, to_block]`, ordered by
    /// block number and log index.
    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        filter: &LogFilter,
    ) -> Result<Vec<RawEventLog>, BlockchainError>;
}
