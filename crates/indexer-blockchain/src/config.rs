use std::time::Duration;

use alloy::{primitives::Address, transports::http::reqwest::Url};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, rpc_executor::RetryPolicy};

/// Chain access settings for the indexer.
///
/// Endpoints are tried in order; the first one is used after `connect()` and
/// the governor rotates to the next one when calls keep failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockchainConfigRaw {
    /// HTTP JSON-RPC endpoints. At least one is required.
    #[serde(default)]
    pub rpc_endpoints: Vec<String>,

    /// Address of the shielded pool contract whose events are indexed.
    pub contract_address: String,

    /// Maximum RPC requests per second (optional rate limiting).
    /// Set this based on your RPC provider's rate limits.
    pub max_rpc_requests_per_second: Option<u32>,

    /// Total attempts per RPC operation, including the first one.
    pub max_retries: usize,

    /// Delay before the second attempt; doubles on each further attempt.
    pub retry_delay_ms: u64,

    /// Upper bound for a single backoff delay.
    pub retry_max_delay_ms: u64,

    /// Number of operations run concurrently by a batched governor call.
    pub batch_size: usize,
}

impl BlockchainConfigRaw {
    /// Ensures at least one RPC endpoint is configured.
    pub fn ensure_rpc_endpoints(&self) -> Result<(), ConfigError> {
        if self.rpc_endpoints.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "rpc_endpoints must include at least one endpoint".to_string(),
            ));
        }
        Ok(())
    }

    /// Ensures the RPC rate limit, if configured, is greater than zero.
    pub fn ensure_max_rpc_requests_per_second(&self) -> Result<(), ConfigError> {
        if self.max_rpc_requests_per_second == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "max_rpc_requests_per_second must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ensure_retry_settings(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve(self) -> Result<BlockchainConfig, ConfigError> {
        let config = self;
        config.ensure_rpc_endpoints()?;
        config.ensure_max_rpc_requests_per_second()?;
        config.ensure_retry_settings()?;

        let rpc_endpoints = config
            .rpc_endpoints
            .iter()
            .map(|endpoint| parse_endpoint(endpoint))
            .collect::<Result<Vec<_>, _>>()?;
        let contract_address = parse_evm_address(&config.contract_address)?;

        Ok(BlockchainConfig {
            rpc_endpoints,
            contract_address,
            max_rpc_requests_per_second: config.max_rpc_requests_per_second,
            retry_policy: RetryPolicy {
                max_attempts: config.max_retries,
                base_delay: Duration::from_millis(config.retry_delay_ms),
                max_delay: Duration::from_millis(config.retry_max_delay_ms),
            },
            batch_size: config.batch_size,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BlockchainConfig {
    pub rpc_endpoints: Vec<Url>,
    pub contract_address: Address,
    pub max_rpc_requests_per_second: Option<u32>,
    pub retry_policy: RetryPolicy,
    pub batch_size: usize,
}

impl BlockchainConfig {
    pub fn rpc_endpoints(&self) -> &[Url] {
        &self.rpc_endpoints
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn max_rpc_requests_per_second(&self) -> Option<u32> {
        self.max_rpc_requests_per_second
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    let url = value.parse::<Url>().map_err(|e| {
        ConfigError::InvalidConfig(format!("invalid RPC endpoint '{}': {}", value, e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidConfig(format!(
            "unsupported RPC endpoint scheme '{}' in '{}'",
            other, value
        ))),
    }
}

fn parse_evm_address(value: &str) -> Result<Address, ConfigError> {
    value
        .parse::<Address>()
        .map_err(|e| ConfigError::InvalidConfig(format!("invalid EVM address '{}': {}", value, e)))
}
