use std::net::{IpAddr, SocketAddr};

use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    state::HttpApiState,
    v1::{
        commitments_http_api_controller::CommitmentsHttpApiController,
        health_http_api_controller::HealthHttpApiController,
        leaves_http_api_controller::LeavesHttpApiController,
        unspents_http_api_controller::UnspentsHttpApiController,
    },
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpApiConfig {
    /// Whether the HTTP API server is enabled.
    pub enabled: bool,
    pub host: IpAddr,
    pub port: u16,
}

pub struct HttpApiRouter {
    config: HttpApiConfig,
    router: Router,
}

impl HttpApiRouter {
    pub fn new(config: &HttpApiConfig, state: HttpApiState) -> Self {
        let router = routes()
            .with_state(state)
            // Last added runs first: CORS wraps request tracing.
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        HttpApiRouter {
            config: config.to_owned(),
            router,
        }
    }

    pub async fn listen_and_handle_http_requests(
        self,
        shutdown: CancellationToken,
    ) -> std::io::Result<()> {
        let addr = SocketAddr::new(self.config.host, self.config.port);
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(address = %addr, "HTTP API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
    }
}

fn routes() -> Router<HttpApiState> {
    Router::new()
        .route("/health", get(HealthHttpApiController::handle_request))
        .route("/v1/unspents", get(UnspentsHttpApiController::handle_request))
        .route(
            "/v1/leaves/{tree_index}",
            get(LeavesHttpApiController::handle_request),
        )
        .route(
            "/v1/commitments/{commitment}",
            get(CommitmentsHttpApiController::handle_request),
        )
}
