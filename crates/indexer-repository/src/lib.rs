mod config;
mod config_error;
pub mod error;
mod manager;
mod migrations;
mod models;
mod observability;
mod repositories;
mod store;
mod types;

pub use config::{RepositoryManagerConfig, RepositoryManagerConfigRaw};
pub use config_error::ConfigError;
pub use manager::RepositoryManager;
pub use repositories::{
    checkpoint_repository::CheckpointRepository,
    leaf_repository::LeafRepository,
    unspent_repository::{MAX_PAGE_SPAN, UnspentRepository},
};
pub use store::{CheckpointStore, RecordStore, SqlRecordStore};
