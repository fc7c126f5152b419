mod chains;
mod config;
mod config_error;
mod contract_events;
mod decoder;
mod error;
mod reader;
mod rpc_executor;
mod rpc_rate_limiter;

pub use chains::evm::{EvmChainReader, RpcEndpoints};
pub use config::{BlockchainConfig, BlockchainConfigRaw};
pub use config_error::ConfigError;
pub use contract_events::{PoolEventKind, Shield, Transfer, monitored_event_signatures};
pub use decoder::{
    CacheKey, CacheStats, DecodeCache, DecodeError, DecodedEvent, DecoderConfig, DecoderOptions,
    EventDecoder,
};
pub use error::BlockchainError;
pub use reader::{ChainReader, LogFilter};
pub use rpc_executor::{
    EndpointSwitch, GovernorError, RetryPolicy, RpcGovernor, backoff_delay,
};
pub use rpc_rate_limiter::RpcRateLimiter;
