use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Failures that can occur while relaying a request to an upstream backend.
///
/// Every variant maps onto a response with the JSON body shape
/// `{"error": {"code": "...", "message": "..."}}` so browser clients can
/// handle all failures uniformly.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream replied with a non-2xx status. The status is relayed to
    /// the client as-is.
    #[error("{service} Error: {status} - {reason}", status = .code.as_u16())]
    Http {
        /// Human-readable name of the backend that failed.
        service: &'static str,
        /// The status code the upstream replied with.
        code: StatusCode,
        /// The canonical reason phrase for that status.
        reason: String,
    },

    /// The upstream could not be reached at all, or did not answer within
    /// the per-route deadline.
    #[error("Connection Error: {reason}")]
    Connection {
        /// Description of the network failure.
        reason: String,
    },

    /// Anything else, including a malformed JSON body on the routed-search
    /// endpoint.
    #[error("Unexpected Error: {detail}")]
    Unexpected {
        /// Description of the failure.
        detail: String,
    },
}

impl UpstreamError {
    /// The status code the client receives for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http { code, .. } => *code,
            Self::Connection { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        warn!(code = status.as_u16(), "{message}");
        (
            status,
            Json(ErrorResponse {
                error: ErrorDetail {
                    code: status.as_u16().to_string(),
                    message,
                },
            }),
        )
            .into_response()
    }
}

impl ErrorResponse {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.as_u16().to_string(),
                message: message.into(),
            },
        }
    }
}
