use crate::{error::UpstreamError, http_client::HttpClient};
use axum::http::{StatusCode, header};
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Shared forwarding primitive used by every relay route.
///
/// Issues a single outbound POST carrying `body` as JSON, waits up to
/// `timeout` for the full response and returns the upstream status together
/// with the raw response bytes. Non-2xx replies and network failures are
/// surfaced as [`UpstreamError`]s; no retries are attempted.
pub async fn forward(
    client: &HttpClient,
    service: &'static str,
    url: &Url,
    body: Bytes,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<(StatusCode, Bytes), UpstreamError> {
    debug!(%url, bytes = body.len(), "Forwarding request to {service}");

    let mut request = client
        .post(url.clone())
        .header(header::CONTENT_TYPE, "application/json")
        .timeout(timeout)
        .body(body);
    if let Some(api_key) = api_key {
        request = request.header("x-api-key", api_key);
    }

    let response = request.send().await.map_err(|err| {
        if err.is_timeout() || err.is_connect() {
            UpstreamError::Connection {
                reason: err.to_string(),
            }
        } else {
            UpstreamError::Unexpected {
                detail: err.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Http {
            service,
            code: status,
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_owned(),
        });
    }

    let data = response
        .bytes()
        .await
        .map_err(|err| UpstreamError::Unexpected {
            detail: err.to_string(),
        })?;
    info!(status = status.as_u16(), bytes = data.len(), "Received response from {service}");
    Ok((status, data))
}
