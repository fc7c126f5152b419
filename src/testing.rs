//! In-memory stores and a scripted chain reader shared by unit tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
};

use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use indexer_blockchain::{BlockchainError, ChainReader, LogFilter, Shield, Transfer};
use indexer_domain::{
    Address, B256, Bytes, Checkpoint, LeafRecord, RawEventLog, U256, UnspentRecord,
};
use indexer_repository::{
    CheckpointStore, MAX_PAGE_SPAN, RecordStore,
    error::{RepositoryError, Result},
};

/// Ordered log of side effects observed across fakes.
#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn injected() -> RepositoryError {
    RepositoryError::InvalidRecord("injected failure".to_string())
}

/// Consumes one injected failure, if any remain.
fn take_failure(remaining: &AtomicUsize) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

pub(crate) struct FakeChainReader {
    height: AtomicU64,
    logs: Vec<RawEventLog>,
    connected: AtomicBool,
    fail_height: AtomicBool,
    ranges: Mutex<Vec<(u64, u64)>>,
    journal: Journal,
}

impl FakeChainReader {
    pub(crate) fn new(height: u64, logs: Vec<RawEventLog>, journal: Journal) -> Self {
        Self {
            height: AtomicU64::new(height),
            logs,
            connected: AtomicBool::new(false),
            fail_height: AtomicBool::new(false),
            ranges: Mutex::new(Vec::new()),
            journal,
        }
    }

    pub(crate) fn fail_height(&self) {
        self.fail_height.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fetched_ranges(&self) -> Vec<(u64, u64)> {
        self.ranges.lock().unwrap().clone()
    }

    pub(crate) fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainReader for FakeChainReader {
    async fn connect(&self) -> std::result::Result<(), BlockchainError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn is_connected(&self) -> bool {
        self.connected()
    }

    async fn current_height(&self) -> std::result::Result<u64, BlockchainError> {
        if !self.connected() || self.fail_height.load(Ordering::SeqCst) {
            return Err(BlockchainError::NotConnected);
        }
        Ok(self.height.load(Ordering::SeqCst))
    }

    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        _filter: &LogFilter,
    ) -> std::result::Result<Vec<RawEventLog>, BlockchainError> {
        self.ranges.lock().unwrap().push((from_block, to_block));
        self.journal.push(format!("get_logs {from_block}-{to_block}"));
        Ok(self
            .logs
            .iter()
            .filter(|log| (from_block..=to_block).contains(&log.block_number))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct MemoryCheckpointStore {
    checkpoint: Mutex<Option<Checkpoint>>,
    writes: Mutex<Vec<u64>>,
    failing_loads: AtomicUsize,
    journal: Journal,
}

impl MemoryCheckpointStore {
    pub(crate) fn new(checkpoint: Option<Checkpoint>, journal: Journal) -> Self {
        Self {
            checkpoint: Mutex::new(checkpoint),
            journal,
            ..Default::default()
        }
    }

    pub(crate) fn fail_loads(&self, count: usize) {
        self.failing_loads.store(count, Ordering::SeqCst);
    }

    pub(crate) fn current(&self) -> Option<Checkpoint> {
        *self.checkpoint.lock().unwrap()
    }

    pub(crate) fn written_cursors(&self) -> Vec<u64> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get_checkpoint(&self) -> Result<Option<Checkpoint>> {
        if take_failure(&self.failing_loads) {
            return Err(injected());
        }
        Ok(self.current())
    }

    async fn set_checkpoint(
        &self,
        last_indexed_block: u64,
        latest_observed_block: u64,
    ) -> Result<Checkpoint> {
        self.journal.push(format!("checkpoint {last_indexed_block}"));
        self.writes.lock().unwrap().push(last_indexed_block);

        let mut checkpoint = self.checkpoint.lock().unwrap();
        let cursor = (*checkpoint)
            .map(|current| current.last_indexed_block.max(last_indexed_block))
            .unwrap_or(last_indexed_block);
        let stored = Checkpoint::new(cursor, latest_observed_block);
        *checkpoint = Some(stored);
        Ok(stored)
    }
}

#[derive(Default)]
pub(crate) struct MemoryRecordStore {
    leaves: Mutex<Vec<LeafRecord>>,
    unspents: Mutex<Vec<UnspentRecord>>,
    failing_leaf_inserts: AtomicUsize,
    failing_unspent_inserts: AtomicUsize,
    journal: Journal,
}

impl MemoryRecordStore {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub(crate) fn fail_leaf_inserts(&self, count: usize) {
        self.failing_leaf_inserts.store(count, Ordering::SeqCst);
    }

    pub(crate) fn fail_unspent_inserts(&self, count: usize) {
        self.failing_unspent_inserts.store(count, Ordering::SeqCst);
    }

    pub(crate) fn leaves(&self) -> Vec<LeafRecord> {
        self.leaves.lock().unwrap().clone()
    }

    pub(crate) fn unspents(&self) -> Vec<UnspentRecord> {
        self.unspents.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_leaves(&self, records: &[LeafRecord]) -> Result<()> {
        if take_failure(&self.failing_leaf_inserts) {
            return Err(injected());
        }
        self.journal.push(format!("leaves {}", records.len()));
        let mut leaves = self.leaves.lock().unwrap();
        for record in records {
            let duplicate = leaves.iter().any(|leaf| {
                leaf.tx_id == record.tx_id
                    && leaf.log_index == record.log_index
                    && leaf.block_number == record.block_number
            });
            if !duplicate {
                leaves.push(record.clone());
            }
        }
        Ok(())
    }

    async fn insert_unspents(&self, records: &[UnspentRecord]) -> Result<()> {
        if take_failure(&self.failing_unspent_inserts) {
            return Err(injected());
        }
        self.journal.push(format!("unspents {}", records.len()));
        let mut unspents = self.unspents.lock().unwrap();
        for record in records {
            let duplicate = unspents.iter().any(|unspent| {
                unspent.tx_id == record.tx_id && unspent.block_number == record.block_number
            });
            if !duplicate {
                unspents.push(record.clone());
            }
        }
        Ok(())
    }

    async fn find_leaf_by_commitment(&self, commitment: &B256) -> Result<Option<LeafRecord>> {
        Ok(self
            .leaves()
            .into_iter()
            .find(|leaf| leaf.commitment == *commitment))
    }

    async fn find_leaves_by_tree_index(&self, tree_index: &U256) -> Result<Vec<LeafRecord>> {
        Ok(self
            .leaves()
            .into_iter()
            .filter(|leaf| leaf.tree_index == *tree_index)
            .collect())
    }

    async fn count_unspents(&self, is_encrypted: bool) -> Result<u64> {
        Ok(self
            .unspents()
            .iter()
            .filter(|unspent| unspent.is_encrypted() == is_encrypted)
            .count() as u64)
    }

    async fn list_unspents(
        &self,
        is_encrypted: bool,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UnspentRecord>> {
        let mut matching: Vec<_> = self
            .unspents()
            .into_iter()
            .filter(|unspent| unspent.is_encrypted() == is_encrypted)
            .collect();
        matching.sort_by_key(|unspent| (unspent.block_number, unspent.tx_id));
        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit.min(MAX_PAGE_SPAN) as usize)
            .collect())
    }
}

pub(crate) fn shield_log(block_number: u64, tx_byte: u8, tree_index: u64) -> RawEventLog {
    let encoded = Shield {
        shieldAddress: B256::repeat_byte(0x01),
        commitment: B256::repeat_byte(tx_byte.wrapping_add(0x40)),
        token: Address::repeat_byte(0xaa),
        nonce: U256::from(1),
        amount: U256::from(5_000u64),
        treeIndex: U256::from(tree_index),
    }
    .encode_log_data();
    raw_log(block_number, tx_byte, encoded.topics().to_vec(), encoded.data)
}

pub(crate) fn transfer_log(block_number: u64, tx_byte: u8, tree_index: u64) -> RawEventLog {
    let encoded = Transfer {
        commitment: B256::repeat_byte(tx_byte.wrapping_add(0x40)),
        encryptedPayload: Bytes::from_static(b"sealed-note"),
        treeIndex: U256::from(tree_index),
    }
    .encode_log_data();
    raw_log(block_number, tx_byte, encoded.topics().to_vec(), encoded.data)
}

pub(crate) fn raw_log(
    block_number: u64,
    tx_byte: u8,
    topics: Vec<B256>,
    data: Bytes,
) -> RawEventLog {
    RawEventLog {
        address: Address::repeat_byte(0x99),
        topics,
        data,
        block_number,
        tx_id: B256::repeat_byte(tx_byte),
        log_index: 0,
    }
}
