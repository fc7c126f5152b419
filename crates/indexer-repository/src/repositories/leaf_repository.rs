use std::{sync::Arc, time::Instant};

use indexer_domain::{B256, LeafRecord, U256};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::OnConflict,
};

use super::INSERT_CHUNK_SIZE;
use crate::{
    error::Result,
    models::leaf::{Column, Entity},
    observability::observe,
    types::{hash_to_db, leaf_from_model, leaf_to_active_model},
};

#[derive(Clone)]
pub struct LeafRepository {
    conn: Arc<DatabaseConnection>,
}

impl LeafRepository {
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }

    /// Bulk insert leaves. Rows whose `(tx_id, log_index, block_number)` already
    /// exists are skipped; the rest are committed.
    pub async fn insert_leaves(&self, records: &[LeafRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let result = self.insert_chunks(records).await;
        observe("leaves", "insert_leaves", started, &result, |_| {
            Some(records.len())
        });
        result
    }

    async fn insert_chunks(&self, records: &[LeafRecord]) -> Result<()> {
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let models = chunk
                .iter()
                .map(leaf_to_active_model)
                .collect::<Result<Vec<_>>>()?;

            // Updating tx_id to itself turns a duplicate key into a no-op (MySQL compatible).
            Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([Column::TxId, Column::LogIndex, Column::BlockNumber])
                        .update_column(Column::TxId)
                        .to_owned(),
                )
                .exec_without_returning(self.conn.as_ref())
                .await?;
        }
        Ok(())
    }

    /// Earliest leaf carrying `commitment`, if any.
    pub async fn find_by_commitment(&self, commitment: &B256) -> Result<Option<LeafRecord>> {
        let started = Instant::now();
        let result = self.query_by_commitment(commitment).await;

        observe("leaves", "find_by_commitment", started, &result, |leaf| {
            Some(usize::from(leaf.is_some()))
        });
        result
    }

    /// Every leaf assigned to `tree_index`, in chain order.
    pub async fn find_by_tree_index(&self, tree_index: &U256) -> Result<Vec<LeafRecord>> {
        let started = Instant::now();
        let result = self.query_by_tree_index(tree_index).await;

        observe("leaves", "find_by_tree_index", started, &result, |leaves| {
            Some(leaves.len())
        });
        result
    }

    async fn query_by_commitment(&self, commitment: &B256) -> Result<Option<LeafRecord>> {
        Entity::find()
            .filter(Column::Commitment.eq(hash_to_db(commitment)))
            .order_by_asc(Column::BlockNumber)
            .order_by_asc(Column::LogIndex)
            .one(self.conn.as_ref())
            .await?
            .map(leaf_from_model)
            .transpose()
    }

    async fn query_by_tree_index(&self, tree_index: &U256) -> Result<Vec<LeafRecord>> {
        Entity::find()
            .filter(Column::TreeIndex.eq(tree_index.to_string()))
            .order_by_asc(Column::BlockNumber)
            .order_by_asc(Column::LogIndex)
            .all(self.conn.as_ref())
            .await?
            .into_iter()
            .map(leaf_from_model)
            .collect()
    }

    pub async fn count(&self) -> Result<u64> {
        let started = Instant::now();
        let result = Entity::find()
            .count(self.conn.as_ref())
            .await
            .map_err(Into::into);
        observe("leaves", "count", started, &result, |_| None);
        result
    }
}
