use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::dto::{error::ErrorResponse, health::HealthResponse};
use crate::controllers::http_api::HttpApiState;

pub(crate) struct HealthHttpApiController;

impl HealthHttpApiController {
    /// Last good checkpoint and current engine state. Keeps answering while
    /// the engine is backing off from errors.
    pub(crate) async fn handle_request(State(state): State<HttpApiState>) -> Response {
        let sync_state = state.status().state;
        match state.checkpoint().await {
            Ok(Some(checkpoint)) => {
                Json(HealthResponse::new(checkpoint, sync_state)).into_response()
            }
            Ok(None) => ErrorResponse::respond(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("No checkpoint written yet (state: {sync_state})"),
            ),
            Err(error) => {
                tracing::error!(error = %error, "Failed to read checkpoint");
                ErrorResponse::respond(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Checkpoint store unavailable",
                )
            }
        }
    }
}
