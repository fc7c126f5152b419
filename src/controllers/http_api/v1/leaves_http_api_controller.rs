use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use indexer_domain::U256;

use super::dto::{error::ErrorResponse, leaves::LeavesResponse};
use crate::controllers::http_api::HttpApiState;

pub(crate) struct LeavesHttpApiController;

impl LeavesHttpApiController {
    /// All commitments stored at one tree position.
    pub(crate) async fn handle_request(
        State(state): State<HttpApiState>,
        Path(tree_index): Path<String>,
    ) -> Response {
        let Ok(index) = U256::from_str(&tree_index) else {
            return ErrorResponse::respond(
                StatusCode::BAD_REQUEST,
                format!("Tree index: {tree_index} is not a valid unsigned integer"),
            );
        };

        match state.records().find_leaves_by_tree_index(&index).await {
            Ok(leaves) => Json(LeavesResponse::new(&index, &leaves)).into_response(),
            Err(error) => {
                tracing::error!(tree_index = %index, error = %error, "Failed to load leaves");
                ErrorResponse::respond(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load leaves")
            }
        }
    }
}
