mod checkpoint;
mod raw_log;
mod records;

pub use checkpoint::Checkpoint;
pub use raw_log::RawEventLog;
pub use records::{LeafRecord, UnspentPayload, UnspentRecord};

pub use alloy::primitives::{Address, B256, Bytes, U256};
