use alloy::primitives::{Address, B256, Bytes};

/// A contract event log as returned by the chain, before decoding.
///
/// Only lives for the duration of one sync batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: u64,
    pub tx_id: B256,
    pub log_index: u32,
}

impl RawEventLog {
    /// Event signature hash, if the log carries any topics.
    pub fn signature(&self) -> Option<&B256> {
        self.topics.first()
    }
}
