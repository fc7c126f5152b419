use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] Box<figment::Error>),

    #[error("Missing required config file: {0}")]
    MissingConfig(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid blockchain configuration: {0}")]
    Blockchain(#[from] indexer_blockchain::ConfigError),

    #[error("Invalid repository configuration: {0}")]
    Repository(#[from] indexer_repository::ConfigError),
}
