use crate::{AppState, error::UpstreamError, routes::relay_response, upstream::forward};
use axum::{body::Bytes, extract::State, response::Response};
use std::time::Duration;

pub const CHAT_ENDPOINT: &str = "/api/chat";

/// Forward a chat-completion request verbatim to the chat backend.
///
/// The body is not inspected or parsed; whatever the browser sent is what
/// the backend receives, plus the configured `x-api-key` header.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, UpstreamError> {
    let upstream = &state.settings.upstream_settings;
    let (status, data) = forward(
        &state.client,
        "Chat Backend",
        &upstream.chat_url,
        body,
        Some(&upstream.chat_api_key),
        Duration::from_secs(upstream.search_timeout),
    )
    .await?;
    Ok(relay_response(status, data))
}
