use indexer_blockchain::BlockchainError;
use indexer_repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Chain reader error: {0}")]
    Chain(#[from] BlockchainError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Sync stopped after {failures} consecutive failures; last error: {last_error}")]
    FatalSyncFailure { failures: u32, last_error: String },
}
