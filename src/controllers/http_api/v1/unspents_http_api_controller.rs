use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use indexer_repository::MAX_PAGE_SPAN;

use super::dto::{
    error::ErrorResponse,
    unspents::{DEFAULT_PAGE_LIMIT, UnspentItem, UnspentsQuery, UnspentsResponse},
};
use crate::controllers::http_api::HttpApiState;

pub(crate) struct UnspentsHttpApiController;

impl UnspentsHttpApiController {
    pub(crate) async fn handle_request(
        State(state): State<HttpApiState>,
        Query(query): Query<UnspentsQuery>,
    ) -> Response {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_SPAN);
        let records = state.records();

        let page = async {
            let total = records.count_unspents(query.encrypted).await?;
            let items = records
                .list_unspents(query.encrypted, query.offset, limit)
                .await?;
            Ok::<_, indexer_repository::error::RepositoryError>((total, items))
        };

        match page.await {
            Ok((total, items)) => Json(UnspentsResponse {
                total,
                offset: query.offset,
                limit,
                items: items.iter().map(UnspentItem::from).collect(),
            })
            .into_response(),
            Err(error) => {
                tracing::error!(
                    encrypted = query.encrypted,
                    offset = query.offset,
                    limit,
                    error = %error,
                    "Failed to list unspents"
                );
                ErrorResponse::respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to list unspents",
                )
            }
        }
    }
}
