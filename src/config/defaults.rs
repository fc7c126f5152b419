//! Typed default configurations for each environment.
//!
//! Each environment (development, production) gets a fully constructed
//! [`ConfigRaw`] via [`config_for`]. Files and `INDEXER_*` variables are
//! layered on top by the loader.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use indexer_blockchain::{BlockchainConfigRaw, DecoderConfig};
use indexer_repository::RepositoryManagerConfigRaw;

use super::{ConfigError, ConfigRaw};
use crate::{
    controllers::http_api::HttpApiConfig,
    logger::{LogFormat, LoggerConfig, TelemetryConfig, TelemetryMetricsConfig},
    sync::SyncConfig,
};

/// Returns the default [`ConfigRaw`] for the given environment name.
pub(crate) fn config_for(environment: &str) -> Result<ConfigRaw, ConfigError> {
    match environment {
        "development" => Ok(development()),
        "production" => Ok(production()),
        _ => Err(ConfigError::UnknownEnvironment(environment.to_string())),
    }
}

// ── Shared defaults ─────────

fn sync() -> SyncConfig {
    SyncConfig {
        start_block: 0,
        max_blocks_per_batch: 1000,
        block_difference: 10,
        poll_delay_ms: 5000,
        max_consecutive_failures: 10,
    }
}

fn decoder() -> DecoderConfig {
    DecoderConfig {
        cache_capacity: 10_000,
        cache_ttl_secs: 600,
        validate: false,
    }
}

fn blockchain(rpc_endpoints: Vec<String>, contract_address: &str) -> BlockchainConfigRaw {
    BlockchainConfigRaw {
        rpc_endpoints,
        contract_address: contract_address.to_string(),
        max_rpc_requests_per_second: Some(10),
        max_retries: 3,
        retry_delay_ms: 1000,
        retry_max_delay_ms: 60_000,
        batch_size: 4,
    }
}

fn repository(url: Option<&str>) -> RepositoryManagerConfigRaw {
    RepositoryManagerConfigRaw {
        url: url.map(str::to_string),
        user: "indexer".to_string(),
        password: None,
        database: "shielded_indexer".to_string(),
        host: "localhost".to_string(),
        port: 3306,
        max_connections: 10,
        min_connections: 1,
    }
}

// ── Environments ─────────

fn development() -> ConfigRaw {
    ConfigRaw {
        environment: "development".to_string(),
        logger: LoggerConfig {
            level: "info,shielded_indexer=debug,sqlx=warn".to_string(),
            format: LogFormat::Pretty,
        },
        telemetry: TelemetryConfig {
            metrics: TelemetryMetricsConfig {
                enabled: false,
                bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 9464)),
            },
        },
        http_api: HttpApiConfig {
            enabled: true,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        },
        sync: sync(),
        blockchain: blockchain(
            vec!["http://localhost:8545".to_string()],
            "0x0000000000000000000000000000000000000000",
        ),
        decoder: decoder(),
        repository: repository(Some("sqlite://shielded-indexer.db?mode=rwc")),
    }
}

/// Production expects `blockchain.rpc_endpoints`, `blockchain.contract_address`
/// and `DB_PASSWORD` to be supplied.
fn production() -> ConfigRaw {
    ConfigRaw {
        environment: "production".to_string(),
        logger: LoggerConfig {
            level: "info,sqlx=warn".to_string(),
            format: LogFormat::Json,
        },
        telemetry: TelemetryConfig {
            metrics: TelemetryMetricsConfig {
                enabled: true,
                bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9464)),
            },
        },
        http_api: HttpApiConfig {
            enabled: true,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        },
        sync: sync(),
        blockchain: blockchain(Vec::new(), ""),
        decoder: decoder(),
        repository: repository(None),
    }
}
