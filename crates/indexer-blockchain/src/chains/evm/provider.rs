use alloy::{
    network::Ethereum,
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{error::BlockchainError, rpc_executor::EndpointSwitch};

pub(crate) type ChainProvider = DynProvider<Ethereum>;

struct ActiveEndpoint {
    index: usize,
    provider: ChainProvider,
}

/// Configured RPC endpoints plus the provider for the one currently in use.
///
/// Nothing is active until [`RpcEndpoints::connect`] is called.
pub struct RpcEndpoints {
    endpoints: Vec<Url>,
    active: RwLock<Option<ActiveEndpoint>>,
}

impl RpcEndpoints {
    pub fn new(endpoints: Vec<Url>) -> Result<Self, BlockchainError> {
        if endpoints.is_empty() {
            return Err(BlockchainError::NoEndpoints);
        }

        Ok(Self {
            endpoints,
            active: RwLock::new(None),
        })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Activate the first endpoint. Keeps the current one if already connected.
    pub async fn connect(&self) {
        let mut active = self.active.write().await;
        if active.is_some() {
            return;
        }

        let Some(url) = self.endpoints.first() else {
            return;
        };
        *active = Some(ActiveEndpoint {
            index: 0,
            provider: build_provider(url),
        });
        tracing::info!(endpoint = %display_endpoint(url), "RPC endpoint activated");
    }

    pub async fn close(&self) {
        *self.active.write().await = None;
    }

    pub async fn is_connected(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// Index of the active endpoint in the configured list.
    pub async fn active_index(&self) -> Option<usize> {
        self.active.read().await.as_ref().map(|active| active.index)
    }

    pub(crate) async fn provider(&self) -> Result<ChainProvider, BlockchainError> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|active| active.provider.clone())
            .ok_or(BlockchainError::NotConnected)
    }
}

#[async_trait]
impl EndpointSwitch for RpcEndpoints {
    async fn attempt_switch(&self) -> bool {
        if self.endpoints.len() < 2 {
            return false;
        }

        let mut active = self.active.write().await;
        let Some(current) = active.as_mut() else {
            return false;
        };

        let next = (current.index + 1) % self.endpoints.len();
        let url = &self.endpoints[next];
        current.index = next;
        current.provider = build_provider(url);
        tracing::warn!(endpoint = %display_endpoint(url), "Switched to next RPC endpoint");
        true
    }
}

fn build_provider(url: &Url) -> ChainProvider {
    ProviderBuilder::new().connect_http(url.clone()).erased()
}

/// Endpoint rendered without path or query, which often carry API keys.
fn display_endpoint(url: &Url) -> String {
    match url.host_str() {
        Some(host) => format!("{}://{}", url.scheme(), host),
        None => url.scheme().to_string(),
    }
}
