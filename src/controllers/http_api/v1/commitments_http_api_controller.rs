use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use indexer_domain::B256;

use super::dto::{error::ErrorResponse, leaves::CommitmentResponse};
use crate::controllers::http_api::HttpApiState;

pub(crate) struct CommitmentsHttpApiController;

impl CommitmentsHttpApiController {
    /// Reverse lookup of the tree position holding a commitment.
    pub(crate) async fn handle_request(
        State(state): State<HttpApiState>,
        Path(commitment): Path<String>,
    ) -> Response {
        let Ok(hash) = B256::from_str(&commitment) else {
            return ErrorResponse::respond(
                StatusCode::BAD_REQUEST,
                format!("Commitment: {commitment} is not a 32-byte hex hash"),
            );
        };

        match state.records().find_leaf_by_commitment(&hash).await {
            Ok(Some(leaf)) => Json(CommitmentResponse::new(&hash, &leaf)).into_response(),
            Ok(None) => ErrorResponse::respond(
                StatusCode::NOT_FOUND,
                format!("Commitment: {hash:#x} is not indexed"),
            ),
            Err(error) => {
                tracing::error!(commitment = %hash, error = %error, "Failed to look up commitment");
                ErrorResponse::respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to look up commitment",
                )
            }
        }
    }
}
