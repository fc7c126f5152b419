use std::{sync::Arc, time::Instant};

use indexer_domain::UnspentRecord;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::OnConflict,
};

use super::INSERT_CHUNK_SIZE;
use crate::{
    error::Result,
    models::unspent::{Column, Entity},
    observability::observe,
    types::{unspent_from_model, unspent_to_active_model},
};

/// Largest page `list_unspents` returns.
pub const MAX_PAGE_SPAN: u64 = 1100;

#[derive(Clone)]
pub struct UnspentRepository {
    conn: Arc<DatabaseConnection>,
}

impl UnspentRepository {
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }

    /// Bulk insert unspents. Rows whose `(tx_id, block_number)` already exists
    /// are skipped; the rest are committed.
    pub async fn insert_unspents(&self, records: &[UnspentRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let result = self.insert_chunks(records).await;
        observe("unspents", "insert_unspents", started, &result, |_| {
            Some(records.len())
        });
        result
    }

    async fn insert_chunks(&self, records: &[UnspentRecord]) -> Result<()> {
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let models = chunk
                .iter()
                .map(unspent_to_active_model)
                .collect::<Result<Vec<_>>>()?;

            Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([Column::TxId, Column::BlockNumber])
                        .update_column(Column::TxId)
                        .to_owned(),
                )
                .exec_without_returning(self.conn.as_ref())
                .await?;
        }
        Ok(())
    }

    pub async fn count_unspents(&self, is_encrypted: bool) -> Result<u64> {
        let started = Instant::now();
        let result = Entity::find()
            .filter(Column::IsEncrypted.eq(is_encrypted))
            .count(self.conn.as_ref())
            .await
            .map_err(Into::into);

        observe("unspents", "count_unspents", started, &result, |_| None);
        result
    }

    /// One page of unspents of the given kind, ordered by `(block_number, tx_id)`.
    ///
    /// `limit` is clamped to [`MAX_PAGE_SPAN`].
    pub async fn list_unspents(
        &self,
        is_encrypted: bool,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UnspentRecord>> {
        let started = Instant::now();
        let result = self
            .query_page(is_encrypted, offset, limit.min(MAX_PAGE_SPAN))
            .await;

        observe("unspents", "list_unspents", started, &result, |page| {
            Some(page.len())
        });
        result
    }

    async fn query_page(
        &self,
        is_encrypted: bool,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<UnspentRecord>> {
        Entity::find()
            .filter(Column::IsEncrypted.eq(is_encrypted))
            .order_by_asc(Column::BlockNumber)
            .order_by_asc(Column::TxId)
            .offset(offset)
            .limit(limit)
            .all(self.conn.as_ref())
            .await?
            .into_iter()
            .map(unspent_from_model)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use indexer_domain::{Address, B256, Bytes, U256, UnspentPayload};

    use super::*;
    use crate::RepositoryManager;

    fn encrypted(tx: u8, block_number: u64) -> UnspentRecord {
        UnspentRecord {
            block_number,
            tx_id: B256::repeat_byte(tx),
            payload: UnspentPayload::Encrypted {
                payload: Bytes::from(vec![tx; 48]),
            },
        }
    }

    fn public(tx: u8, block_number: u64) -> UnspentRecord {
        UnspentRecord {
            block_number,
            tx_id: B256::repeat_byte(tx),
            payload: UnspentPayload::Public {
                shield_address: B256::repeat_byte(0x51),
                amount: U256::from(10).pow(U256::from(30)),
                nonce: U256::from(9),
                token: Address::repeat_byte(0xaa),
            },
        }
    }

    async fn repository() -> UnspentRepository {
        RepositoryManager::connect_url("sqlite::memory:", 1, 1)
            .await
            .unwrap()
            .unspent_repository()
    }

    #[tokio::test]
    async fn records_round_trip_by_kind() {
        let repository = repository().await;
        let stored = vec![encrypted(1, 100), public(2, 101)];
        repository.insert_unspents(&stored).await.unwrap();

        assert_eq!(repository.count_unspents(true).await.unwrap(), 1);
        assert_eq!(repository.count_unspents(false).await.unwrap(), 1);
        assert_eq!(
            repository.list_unspents(true, 0, 10).await.unwrap(),
            vec![stored[0].clone()]
        );
        assert_eq!(
            repository.list_unspents(false, 0, 10).await.unwrap(),
            vec![stored[1].clone()]
        );
    }

    #[tokio::test]
    async fn duplicate_unspents_are_skipped() {
        let repository = repository().await;
        repository
            .insert_unspents(&[encrypted(1, 100), encrypted(2, 100)])
            .await
            .unwrap();
        repository
            .insert_unspents(&[encrypted(1, 100), encrypted(3, 101)])
            .await
            .unwrap();

        assert_eq!(repository.count_unspents(true).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn list_pages_in_block_order() {
        let repository = repository().await;
        repository
            .insert_unspents(&[
                encrypted(3, 103),
                encrypted(1, 101),
                encrypted(4, 104),
                encrypted(2, 102),
            ])
            .await
            .unwrap();

        let page = repository.list_unspents(true, 1, 2).await.unwrap();

        let blocks: Vec<u64> = page.iter().map(|record| record.block_number).collect();
        assert_eq!(blocks, vec![102, 103]);
    }

    #[tokio::test]
    async fn list_clamps_limit_to_max_page_span() {
        let repository = repository().await;
        let records: Vec<_> = (0..(MAX_PAGE_SPAN + 5))
            .map(|i| UnspentRecord {
                block_number: i,
                tx_id: B256::from(U256::from(i)),
                payload: UnspentPayload::Encrypted {
                    payload: Bytes::from_static(b"x"),
                },
            })
            .collect();
        repository.insert_unspents(&records).await.unwrap();

        let page = repository.list_unspents(true, 0, 5_000).await.unwrap();

        assert_eq!(page.len() as u64, MAX_PAGE_SPAN);
    }
}
