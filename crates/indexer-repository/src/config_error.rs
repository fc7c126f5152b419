use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing database password: {0}")]
    MissingSecret(String),

    #[error("Invalid repository pool settings: {0}")]
    InvalidConfig(String),

    #[error("Unsupported database backend '{0}'; expected mysql or sqlite")]
    UnsupportedBackend(String),
}
