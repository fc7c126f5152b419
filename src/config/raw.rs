use indexer_blockchain::{BlockchainConfig, BlockchainConfigRaw, DecoderConfig};
use indexer_repository::{RepositoryManagerConfig, RepositoryManagerConfigRaw};
use serde::{Deserialize, Serialize};

use crate::{
    config::ConfigError,
    controllers::http_api::HttpApiConfig,
    logger::{LoggerConfig, TelemetryConfig},
    sync::SyncConfig,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigRaw {
    pub environment: String,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub http_api: HttpApiConfig,
    pub sync: SyncConfig,
    pub blockchain: BlockchainConfigRaw,
    pub decoder: DecoderConfig,
    pub repository: RepositoryManagerConfigRaw,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub logger: LoggerConfig,
    pub telemetry: TelemetryConfig,
    pub http_api: HttpApiConfig,
    pub sync: SyncConfig,
    pub blockchain: BlockchainConfig,
    pub decoder: DecoderConfig,
    pub repository: RepositoryManagerConfig,
}

impl ConfigRaw {
    pub fn resolve(self) -> Result<Config, ConfigError> {
        self.logger.ensure_valid()?;
        self.sync.ensure_valid()?;

        Ok(Config {
            environment: self.environment,
            logger: self.logger,
            telemetry: self.telemetry,
            http_api: self.http_api,
            sync: self.sync,
            blockchain: self.blockchain.resolve()?,
            decoder: self.decoder,
            repository: self.repository.resolve()?,
        })
    }
}
