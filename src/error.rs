use thiserror::Error;

/// Top-level application error that composes all subsystem errors
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Database/repository errors
    #[error("Repository error: {0}")]
    Repository(#[from] indexer_repository::error::RepositoryError),

    /// Blockchain-related errors
    #[error("Blockchain error: {0}")]
    Blockchain(#[from] indexer_blockchain::BlockchainError),

    #[error("Sync error: {0}")]
    Sync(#[from] crate::sync::SyncError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task {task} panicked: {reason}")]
    TaskPanicked { task: &'static str, reason: String },
}
