use std::sync::Arc;

use indexer_blockchain::{EventDecoder, EvmChainReader, LogFilter, monitored_event_signatures};
use indexer_repository::{CheckpointStore, RecordStore, RepositoryManager};

use crate::{
    config::Config,
    controllers::http_api::{HttpApiRouter, HttpApiState},
    error::IndexerError,
    sync::SyncEngine,
};

pub(crate) struct CoreBootstrap {
    pub(crate) config: Arc<Config>,
    pub(crate) checkpoints: Arc<dyn CheckpointStore>,
    pub(crate) records: Arc<dyn RecordStore>,
    pub(crate) chain_reader: Arc<EvmChainReader>,
    pub(crate) decoder: Arc<EventDecoder>,
}

/// Connect storage (running migrations) and build the chain reader and decoder.
pub(crate) async fn build_core(config: Config) -> Result<CoreBootstrap, IndexerError> {
    let repository = RepositoryManager::connect(&config.repository).await?;
    tracing::info!(backend = %config.repository.backend(), "Repository initialized");

    let chain_reader = Arc::new(EvmChainReader::new(&config.blockchain)?);
    tracing::info!(
        endpoints = config.blockchain.rpc_endpoints().len(),
        contract = %config.blockchain.contract_address(),
        max_rpc_requests_per_second = ?config.blockchain.max_rpc_requests_per_second(),
        "Chain reader initialized"
    );
    if config.blockchain.contract_address().is_zero() {
        tracing::warn!("Contract address is the zero address; no pool events will match");
    }

    let decoder = Arc::new(EventDecoder::from_config(&config.decoder));

    Ok(CoreBootstrap {
        checkpoints: Arc::new(repository.checkpoint_repository()),
        records: Arc::new(repository.record_store()),
        chain_reader,
        decoder,
        config: Arc::new(config),
    })
}

pub(crate) fn build_sync_engine(core: &CoreBootstrap) -> Arc<SyncEngine> {
    let filter = LogFilter::new(
        vec![core.config.blockchain.contract_address()],
        monitored_event_signatures(),
    );

    Arc::new(SyncEngine::new(
        core.config.sync.clone(),
        core.chain_reader.clone(),
        Arc::clone(&core.decoder),
        Arc::clone(&core.checkpoints),
        Arc::clone(&core.records),
        filter,
    ))
}

pub(crate) fn build_http_router(
    core: &CoreBootstrap,
    sync_engine: &SyncEngine,
) -> Option<HttpApiRouter> {
    let config = &core.config.http_api;
    if !config.enabled {
        tracing::info!("HTTP API disabled");
        return None;
    }

    let state = HttpApiState::new(
        Arc::clone(&core.records),
        Arc::clone(&core.checkpoints),
        sync_engine.subscribe(),
    );
    Some(HttpApiRouter::new(config, state))
}
