use std::sync::Arc;

use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

pub use crate::config::RepositoryManagerConfig;
use crate::{
    error::RepositoryError,
    migrations::Migrator,
    repositories::{
        checkpoint_repository::CheckpointRepository, leaf_repository::LeafRepository,
        unspent_repository::UnspentRepository,
    },
    store::SqlRecordStore,
};

pub struct RepositoryManager {
    checkpoint_repository: CheckpointRepository,
    leaf_repository: LeafRepository,
    unspent_repository: UnspentRepository,
}

impl RepositoryManager {
    /// Creates a new RepositoryManager instance
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if:
    /// - Database connection fails (e.g. database missing, bad credentials)
    /// - Migrations fail
    pub async fn connect(config: &RepositoryManagerConfig) -> Result<Self, RepositoryError> {
        tracing::info!(backend = config.backend(), "Connecting to database");
        Self::connect_url(
            config.connection_string(),
            config.max_connections,
            config.min_connections,
        )
        .await
    }

    /// Connect to any SeaORM URL and apply pending migrations.
    ///
    /// In-memory SQLite (`sqlite::memory:`) needs `max_connections = 1`, since
    /// every pooled connection would otherwise open its own empty database.
    pub async fn connect_url(
        url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .sqlx_logging(true)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        let conn = Arc::new(Database::connect(opt).await?);

        // Apply all pending migrations
        Migrator::up(conn.as_ref(), None).await?;

        Ok(RepositoryManager {
            checkpoint_repository: CheckpointRepository::new(Arc::clone(&conn)),
            leaf_repository: LeafRepository::new(Arc::clone(&conn)),
            unspent_repository: UnspentRepository::new(Arc::clone(&conn)),
        })
    }

    pub fn checkpoint_repository(&self) -> CheckpointRepository {
        self.checkpoint_repository.clone()
    }

    pub fn leaf_repository(&self) -> LeafRepository {
        self.leaf_repository.clone()
    }

    pub fn unspent_repository(&self) -> UnspentRepository {
        self.unspent_repository.clone()
    }

    pub fn record_store(&self) -> SqlRecordStore {
        SqlRecordStore::new(self.leaf_repository(), self.unspent_repository())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use indexer_domain::{B256, LeafRecord, U256};

    use super::*;
    use crate::store::{CheckpointStore, RecordStore};

    #[tokio::test]
    async fn stores_share_one_database() {
        let manager = RepositoryManager::connect_url("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let checkpoints: Arc<dyn CheckpointStore> = Arc::new(manager.checkpoint_repository());
        let records: Arc<dyn RecordStore> = Arc::new(manager.record_store());

        checkpoints.set_checkpoint(11, 20).await.unwrap();
        records
            .insert_leaves(&[LeafRecord {
                block_number: 10,
                log_index: 0,
                tx_id: B256::repeat_byte(1),
                commitment: B256::repeat_byte(2),
                tree_index: U256::from(3),
            }])
            .await
            .unwrap();

        assert_eq!(
            manager.checkpoint_repository().get_checkpoint().await.unwrap().unwrap().last_indexed_block,
            11
        );
        assert_eq!(manager.leaf_repository().count().await.unwrap(), 1);
        assert_eq!(
            records
                .find_leaves_by_tree_index(&U256::from(3))
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
