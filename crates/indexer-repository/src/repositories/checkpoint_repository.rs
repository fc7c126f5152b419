use std::{sync::Arc, time::Instant};

use chrono::Utc;
use indexer_domain::Checkpoint;
use sea_orm::{
    ActiveValue, DatabaseConnection, EntityTrait, TransactionTrait, sea_query::OnConflict,
};

use crate::{
    error::Result,
    models::sync_checkpoint::{ActiveModel, Column, Entity, Model},
    observability::observe,
    types::{block_from_db, block_to_db},
};

/// The checkpoint table holds a single row with this id.
const CHECKPOINT_ROW_ID: i32 = 1;

#[derive(Clone)]
pub struct CheckpointRepository {
    conn: Arc<DatabaseConnection>,
}

impl CheckpointRepository {
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }

    /// Get the stored checkpoint. Returns None before the first write.
    pub async fn get_checkpoint(&self) -> Result<Option<Checkpoint>> {
        let started = Instant::now();
        let result = self.load_checkpoint().await;

        observe("checkpoint", "get_checkpoint", started, &result, |row| {
            Some(usize::from(row.is_some()))
        });
        result
    }

    /// Upsert the singleton checkpoint row and return what is stored afterwards.
    ///
    /// A `last_indexed_block` lower than the stored one is ignored; the stored
    /// cursor never moves backwards. `latest_observed_block` is always updated.
    pub async fn set_checkpoint(
        &self,
        last_indexed_block: u64,
        latest_observed_block: u64,
    ) -> Result<Checkpoint> {
        let started = Instant::now();
        let result = self
            .upsert_checkpoint(last_indexed_block, latest_observed_block)
            .await;

        observe("checkpoint", "set_checkpoint", started, &result, |_| Some(1));
        result
    }

    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>> {
        Entity::find_by_id(CHECKPOINT_ROW_ID)
            .one(self.conn.as_ref())
            .await?
            .map(to_checkpoint)
            .transpose()
    }

    async fn upsert_checkpoint(
        &self,
        last_indexed_block: u64,
        latest_observed_block: u64,
    ) -> Result<Checkpoint> {
        let txn = self.conn.begin().await?;

        let stored = Entity::find_by_id(CHECKPOINT_ROW_ID)
            .one(&txn)
            .await?
            .map(to_checkpoint)
            .transpose()?;

        let last_indexed_block = match stored {
            Some(stored) if stored.last_indexed_block > last_indexed_block => {
                tracing::warn!(
                    stored = stored.last_indexed_block,
                    requested = last_indexed_block,
                    "Ignoring checkpoint write that would move the cursor backwards"
                );
                stored.last_indexed_block
            }
            _ => last_indexed_block,
        };

        let model = ActiveModel {
            id: ActiveValue::Set(CHECKPOINT_ROW_ID),
            last_indexed_block: ActiveValue::Set(block_to_db(last_indexed_block)?),
            latest_observed_block: ActiveValue::Set(block_to_db(latest_observed_block)?),
            updated_at: ActiveValue::Set(Utc::now().timestamp()),
        };
        Entity::insert(model)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([
                        Column::LastIndexedBlock,
                        Column::LatestObservedBlock,
                        Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        Ok(Checkpoint::new(last_indexed_block, latest_observed_block))
    }
}

fn to_checkpoint(model: Model) -> Result<Checkpoint> {
    Ok(Checkpoint::new(
        block_from_db(model.last_indexed_block)?,
        block_from_db(model.latest_observed_block)?,
    ))
}
