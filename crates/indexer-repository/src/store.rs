use async_trait::async_trait;
use indexer_domain::{B256, Checkpoint, LeafRecord, U256, UnspentRecord};

use crate::{
    error::Result,
    repositories::{
        checkpoint_repository::CheckpointRepository, leaf_repository::LeafRepository,
        unspent_repository::UnspentRepository,
    },
};

/// Durable single-row record of sync progress.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get_checkpoint(&self) -> Result<Option<Checkpoint>>;

    /// Upsert the checkpoint and return the stored value.
    async fn set_checkpoint(
        &self,
        last_indexed_block: u64,
        latest_observed_block: u64,
    ) -> Result<Checkpoint>;
}

/// Duplicate-rejecting storage for leaf and unspent records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_leaves(&self, records: &[LeafRecord]) -> Result<()>;

    async fn insert_unspents(&self, records: &[UnspentRecord]) -> Result<()>;

    async fn find_leaf_by_commitment(&self, commitment: &B256) -> Result<Option<LeafRecord>>;

    async fn find_leaves_by_tree_index(&self, tree_index: &U256) -> Result<Vec<LeafRecord>>;

    async fn count_unspents(&self, is_encrypted: bool) -> Result<u64>;

    async fn list_unspents(
        &self,
        is_encrypted: bool,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UnspentRecord>>;
}

#[async_trait]
impl CheckpointStore for CheckpointRepository {
    async fn get_checkpoint(&self) -> Result<Option<Checkpoint>> {
        CheckpointRepository::get_checkpoint(self).await
    }

    async fn set_checkpoint(
        &self,
        last_indexed_block: u64,
        latest_observed_block: u64,
    ) -> Result<Checkpoint> {
        CheckpointRepository::set_checkpoint(self, last_indexed_block, latest_observed_block).await
    }
}

/// [`RecordStore`] over the `leaves` and `unspents` tables.
#[derive(Clone)]
pub struct SqlRecordStore {
    leaves: LeafRepository,
    unspents: UnspentRepository,
}

impl SqlRecordStore {
    pub fn new(leaves: LeafRepository, unspents: UnspentRepository) -> Self {
        Self { leaves, unspents }
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    async fn insert_leaves(&self, records: &[LeafRecord]) -> Result<()> {
        self.leaves.insert_leaves(records).await
    }

    async fn insert_unspents(&self, records: &[UnspentRecord]) -> Result<()> {
        self.unspents.insert_unspents(records).await
    }

    async fn find_leaf_by_commitment(&self, commitment: &B256) -> Result<Option<LeafRecord>> {
        self.leaves.find_by_commitment(commitment).await
    }

    async fn find_leaves_by_tree_index(&self, tree_index: &U256) -> Result<Vec<LeafRecord>> {
        self.leaves.find_by_tree_index(tree_index).await
    }

    async fn count_unspents(&self, is_encrypted: bool) -> Result<u64> {
        self.unspents.count_unspents(is_encrypted).await
    }

    async fn list_unspents(
        &self,
        is_encrypted: bool,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UnspentRecord>> {
        self.unspents.list_unspents(is_encrypted, offset, limit).await
    }
}
