use serde::{Deserialize, Serialize};

use crate::ConfigError;

const SUPPORTED_BACKENDS: [&str; 2] = ["mysql", "sqlite"];

/// Repository manager configuration for database connections.
///
/// Either `url` is set (any SeaORM connection URL, e.g. `sqlite://indexer.db?mode=rwc`),
/// or the MySQL parts are used. For MySQL the password should come from the
/// `DB_PASSWORD` environment variable rather than a config file.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RepositoryManagerConfigRaw {
    #[serde(default)]
    pub url: Option<String>,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl RepositoryManagerConfigRaw {
    pub fn ensure_pool_sizes(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::InvalidConfig(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    pub fn resolve(self) -> Result<RepositoryManagerConfig, ConfigError> {
        self.ensure_pool_sizes()?;

        let url = match self.url {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                let password = self.password.ok_or_else(|| {
                    ConfigError::MissingSecret(
                        "DB_PASSWORD env var or password config required".to_string(),
                    )
                })?;
                format!(
                    "mysql://{}:{}@{}:{}/{}",
                    self.user, password, self.host, self.port, self.database
                )
            }
        };

        let config = RepositoryManagerConfig {
            url,
            max_connections: self.max_connections,
            min_connections: self.min_connections,
        };
        if !SUPPORTED_BACKENDS.contains(&config.backend()) {
            return Err(ConfigError::UnsupportedBackend(config.backend().to_string()));
        }
        Ok(config)
    }
}

#[derive(Clone)]
pub struct RepositoryManagerConfig {
    url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl RepositoryManagerConfig {
    pub fn connection_string(&self) -> &str {
        &self.url
    }

    /// Backend name without credentials, safe to log.
    pub fn backend(&self) -> &str {
        self.url.split(':').next().unwrap_or_default()
    }
}

impl std::fmt::Debug for RepositoryManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryManagerConfig")
            .field("backend", &self.backend())
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}
