use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl ErrorResponse {
    pub(crate) fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_u16(),
            message: message.into(),
        }
    }

    pub(crate) fn respond(code: StatusCode, message: impl Into<String>) -> Response {
        (code, Json(Self::new(code, message))).into_response()
    }
}
