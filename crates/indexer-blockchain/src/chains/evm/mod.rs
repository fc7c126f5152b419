mod provider;

use std::{sync::Arc, time::Instant};

use alloy::{
    primitives::Address,
    providers::Provider,
    rpc::types::{Filter, Log},
};
use async_trait::async_trait;
use indexer_domain::RawEventLog;
use indexer_observability::record_event_logs_batch;
pub use provider::RpcEndpoints;

use crate::{
    config::BlockchainConfig,
    error::BlockchainError,
    reader::{ChainReader, LogFilter},
    rpc_executor::{EndpointSwitch, RpcGovernor},
    rpc_rate_limiter::RpcRateLimiter,
};

/// [`ChainReader`] over EVM JSON-RPC, with every call routed through an [`RpcGovernor`].
pub struct EvmChainReader {
    endpoints: Arc<RpcEndpoints>,
    governor: RpcGovernor,
    batch_size: usize,
}

impl EvmChainReader {
    pub fn new(config: &BlockchainConfig) -> Result<Self, BlockchainError> {
        let endpoints = Arc::new(RpcEndpoints::new(config.rpc_endpoints().to_vec())?);
        let governor = RpcGovernor::new(
            RpcRateLimiter::new(config.max_rpc_requests_per_second()),
            config.retry_policy().clone(),
        )
        .with_endpoint_switch(Arc::clone(&endpoints) as Arc<dyn EndpointSwitch>);

        Ok(Self {
            endpoints,
            governor,
            batch_size: config.batch_size(),
        })
    }

    pub fn endpoints(&self) -> &RpcEndpoints {
        &self.endpoints
    }

    async fn ensure_connected(&self) -> Result<(), BlockchainError> {
        if self.endpoints.is_connected().await {
            Ok(())
        } else {
            Err(BlockchainError::NotConnected)
        }
    }

    fn build_filter(
        from_block: u64,
        to_block: u64,
        address: Option<Address>,
        filter: &LogFilter,
    ) -> Filter {
        let mut rpc_filter = Filter::new().from_block(from_block).to_block(to_block);
        if let Some(address) = address {
            rpc_filter = rpc_filter.address(address);
        }
        if !filter.topics.is_empty() {
            rpc_filter = rpc_filter.event_signature(filter.topics.clone());
        }
        rpc_filter
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn connect(&self) -> Result<(), BlockchainError> {
        self.endpoints.connect().await;
        Ok(())
    }

    async fn close(&self) {
        self.endpoints.close().await;
        tracing::info!("Chain reader closed");
    }

    async fn is_connected(&self) -> bool {
        self.endpoints.is_connected().await
    }

    async fn current_height(&self) -> Result<u64, BlockchainError> {
        self.ensure_connected().await?;

        let height = self
            .governor
            .run("eth_blockNumber", || async {
                let provider = self.endpoints.provider().await?;
                provider
                    .get_block_number()
                    .await
                    .map_err(BlockchainError::get_block_number)
            })
            .await?;

        Ok(height)
    }

    async fn get_logs(
        &self,
        from_block: u64,
        to_block: u64,
        filter: &LogFilter,
    ) -> Result<Vec<RawEventLog>, BlockchainError> {
        self.ensure_connected().await?;

        // One ranged eth_getLogs per contract address; no address means no address filter.
        let filters: Vec<Filter> = if filter.addresses.is_empty() {
            vec![Self::build_filter(from_block, to_block, None, filter)]
        } else {
            filter
                .addresses
                .iter()
                .map(|address| Self::build_filter(from_block, to_block, Some(*address), filter))
                .collect()
        };

        let operations: Vec<_> = filters
            .iter()
            .map(|rpc_filter| {
                move || async move {
                    let provider = self.endpoints.provider().await?;
                    provider
                        .get_logs(rpc_filter)
                        .await
                        .map_err(BlockchainError::get_logs)
                }
            })
            .collect();

        let block_span = to_block.saturating_sub(from_block) + 1;
        let started = Instant::now();
        let batches = match self
            .governor
            .run_batch("eth_getLogs", operations, self.batch_size)
            .await
        {
            Ok(batches) => batches,
            Err(err) => {
                record_event_logs_batch("error", started.elapsed(), block_span, 0);
                return Err(err.into());
            }
        };

        let mut logs: Vec<RawEventLog> = batches
            .into_iter()
            .flatten()
            .filter_map(to_raw_event_log)
            .collect();
        logs.sort_by_key(|log| (log.block_number, log.log_index));

        record_event_logs_batch("success", started.elapsed(), block_span, logs.len());
        tracing::debug!(
            from_block,
            to_block,
            logs = logs.len(),
            "Fetched event logs"
        );

        Ok(logs)
    }
}

fn to_raw_event_log(log: Log) -> Option<RawEventLog> {
    let (Some(block_number), Some(tx_id), Some(log_index)) =
        (log.block_number, log.transaction_hash, log.log_index)
    else {
        tracing::warn!(
            address = %log.address(),
            "Skipping log without block number, transaction hash or log index"
        );
        return None;
    };

    let Ok(log_index) = u32::try_from(log_index) else {
        tracing::warn!(block_number, %tx_id, log_index, "Skipping log with out-of-range log index");
        return None;
    };

    Some(RawEventLog {
        address: log.address(),
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
        block_number,
        tx_id,
        log_index,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use alloy::primitives::{B256, Bytes, LogData};

    use super::*;
    use crate::config::BlockchainConfigRaw;

    fn reader() -> EvmChainReader {
        let config = BlockchainConfigRaw {
            rpc_endpoints: vec!["http://127.0.0.1:1".to_string()],
            contract_address: "0x19B620929f97b7b990801496c3b361ca5dEf8C71".to_string(),
            max_rpc_requests_per_second: None,
            max_retries: 1,
            retry_delay_ms: 1,
            retry_max_delay_ms: 1,
            batch_size: 1,
        }
        .resolve()
        .unwrap();
        EvmChainReader::new(&config).unwrap()
    }

    fn rpc_log(block_number: Option<u64>, log_index: Option<u64>) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: Address::repeat_byte(0x11),
                data: LogData::new_unchecked(
                    vec![B256::repeat_byte(0x22)],
                    Bytes::from_static(&[1, 2, 3]),
                ),
            },
            block_hash: None,
            block_number,
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(0x33)),
            transaction_index: None,
            log_index,
            removed: false,
        }
    }

    #[tokio::test]
    async fn calls_fail_before_connect() {
        let reader = reader();

        assert!(!reader.is_connected().await);
        assert!(matches!(
            reader.current_height().await,
            Err(BlockchainError::NotConnected)
        ));
        assert!(matches!(
            reader.get_logs(1, 2, &LogFilter::default()).await,
            Err(BlockchainError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn connect_and_close_toggle_state() {
        let reader = reader();

        reader.connect().await.unwrap();
        assert!(reader.is_connected().await);
        reader.close().await;
        assert!(!reader.is_connected().await);
    }

    #[test]
    fn to_raw_event_log_copies_fields() {
        let raw = to_raw_event_log(rpc_log(Some(7), Some(3))).unwrap();

        assert_eq!(raw.address, Address::repeat_byte(0x11));
        assert_eq!(raw.topics, vec![B256::repeat_byte(0x22)]);
        assert_eq!(raw.data, Bytes::from_static(&[1, 2, 3]));
        assert_eq!(raw.block_number, 7);
        assert_eq!(raw.tx_id, B256::repeat_byte(0x33));
        assert_eq!(raw.log_index, 3);
    }

    #[test]
    fn to_raw_event_log_skips_pending_logs() {
        assert!(to_raw_event_log(rpc_log(None, Some(0))).is_none());
        assert!(to_raw_event_log(rpc_log(Some(7), None)).is_none());
    }
}
