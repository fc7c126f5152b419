use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;

/// Logger configuration for tracing output.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Filter directives, e.g. "info" or "info,shielded_indexer=debug,sqlx=warn".
    pub level: String,
    /// "pretty" for terminals, "json" for log shippers.
    pub format: LogFormat,
}

impl LoggerConfig {
    /// Rejects filter directives `EnvFilter` cannot parse.
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.level).map(|_| ()).map_err(|error| {
            ConfigError::InvalidConfig(format!(
                "invalid logger.level '{}': {}",
                self.level, error
            ))
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    pub metrics: TelemetryMetricsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TelemetryMetricsConfig {
    /// Whether to expose Prometheus metrics.
    pub enabled: bool,
    pub bind_address: SocketAddr,
}
