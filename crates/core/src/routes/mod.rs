mod chat;
mod search;

pub use chat::*;
pub use search::*;

use crate::error::ErrorResponse;
use axum::{
    Json,
    body::Bytes,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Relay the upstream reply to the client, preserving its status code.
pub(crate) fn relay_response(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

/// Fallback for unknown paths and known paths hit with the wrong method.
pub async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(StatusCode::NOT_FOUND, "Not Found")),
    )
        .into_response()
}
