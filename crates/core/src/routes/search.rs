use crate::{AppState, error::UpstreamError, routes::relay_response, upstream::forward};
use axum::{body::Bytes, extract::State, response::Response};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::debug;

pub const FAST_SEARCH_ENDPOINT: &str = "/api/search/perplexity";
pub const DEEP_SEARCH_ENDPOINT: &str = "/api/search/jina";
pub const SMART_SEARCH_ENDPOINT: &str = "/api/search";

/// Phrases that mark a query as wanting thorough research rather than a
/// quick lookup. Matched case-insensitively as substrings anywhere in the
/// query. German only; queries in other languages always take the fast
/// backend.
const DEEP_SEARCH_TRIGGERS: [&str; 12] = [
    "erkläre im detail",
    "analysiere",
    "analyse",
    "vergleiche detailliert",
    "geschichte von",
    "hintergrund",
    "ausführlich",
    "umfassend",
    "detailliert",
    "wie funktioniert",
    "wissenschaftlich",
    "technisch erklärt",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchBackend {
    Fast,
    Deep,
}

/// Pure routing decision for the smart-search endpoint.
fn select_backend(query: &str, force_deep: bool) -> SearchBackend {
    if force_deep || wants_deep_search(query) {
        SearchBackend::Deep
    } else {
        SearchBackend::Fast
    }
}

fn wants_deep_search(query: &str) -> bool {
    let query = query.to_lowercase();
    DEEP_SEARCH_TRIGGERS
        .iter()
        .any(|phrase| query.contains(phrase))
}

/// Inject the backend-specific request parameters, overwriting any the
/// client supplied itself.
fn apply_backend_fields(payload: &mut Map<String, Value>, backend: SearchBackend) {
    match backend {
        SearchBackend::Deep => {
            payload.insert("model".to_owned(), json!("jina-deepsearch-v1"));
            payload.insert("budget_tokens".to_owned(), json!(8000));
            payload.insert("max_returned_urls".to_owned(), json!(10));
            payload.insert("reasoning_effort".to_owned(), json!("high"));
        }
        SearchBackend::Fast => {
            payload.insert("model".to_owned(), json!("sonar"));
        }
    }
}

/// Forward a search request verbatim to the fast-search backend.
pub async fn fast_search_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, UpstreamError> {
    let upstream = &state.settings.upstream_settings;
    let (status, data) = forward(
        &state.client,
        "Fast Search",
        &upstream.fast_search_url,
        body,
        None,
        Duration::from_secs(upstream.search_timeout),
    )
    .await?;
    Ok(relay_response(status, data))
}

/// Forward a search request verbatim to the deep-research backend.
pub async fn deep_search_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, UpstreamError> {
    let upstream = &state.settings.upstream_settings;
    let (status, data) = forward(
        &state.client,
        "Deep Search",
        &upstream.deep_search_url,
        body,
        None,
        Duration::from_secs(upstream.deep_search_timeout),
    )
    .await?;
    Ok(relay_response(status, data))
}

/// Route a search request to the fast or deep backend based on its query
/// text, then forward the (augmented) payload.
///
/// The body must be a JSON object. `query` (default empty) and `force_deep`
/// (default false) steer the decision; all other fields are passed through
/// to whichever backend is chosen.
pub async fn smart_search_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, UpstreamError> {
    let mut payload: Map<String, Value> =
        serde_json::from_slice(&body).map_err(|err| UpstreamError::Unexpected {
            detail: format!("request body is not a JSON object: {err}"),
        })?;

    let query = payload
        .get("query")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    let force_deep = payload
        .get("force_deep")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let backend = select_backend(&query, force_deep);
    debug!(?backend, force_deep, "Search routing decision");
    apply_backend_fields(&mut payload, backend);

    let outbound = serde_json::to_vec(&payload).map_err(|err| UpstreamError::Unexpected {
        detail: err.to_string(),
    })?;

    let upstream = &state.settings.upstream_settings;
    let (service, url, timeout) = match backend {
        SearchBackend::Deep => (
            "Deep Search",
            &upstream.deep_search_url,
            upstream.deep_search_timeout,
        ),
        SearchBackend::Fast => (
            "Fast Search",
            &upstream.fast_search_url,
            upstream.search_timeout,
        ),
    };

    let (status, data) = forward(
        &state.client,
        service,
        url,
        Bytes::from(outbound),
        None,
        Duration::from_secs(timeout),
    )
    .await?;
    Ok(relay_response(status, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_triggers_match_case_insensitively() {
        assert!(wants_deep_search("Erkläre ausführlich die Geschichte von Rom"));
        assert!(wants_deep_search("WIE FUNKTIONIERT ein Kernreaktor?"));
        assert!(wants_deep_search("bitte eine umfassende Analyse"));
        assert!(wants_deep_search("Hintergrund zur Wahl"));
    }

    #[test]
    fn plain_queries_stay_fast() {
        assert!(!wants_deep_search("Wetter heute"));
        assert!(!wants_deep_search(""));
        // Non-German phrasing never triggers the deep backend.
        assert!(!wants_deep_search("explain the history of Rome in detail"));
    }

    #[test]
    fn force_deep_overrides_query_text() {
        assert_eq!(select_backend("Wetter heute", true), SearchBackend::Deep);
        assert_eq!(select_backend("", true), SearchBackend::Deep);
        assert_eq!(select_backend("Wetter heute", false), SearchBackend::Fast);
    }

    #[test]
    fn deep_fields_are_injected_and_overwrite() {
        let mut payload: Map<String, Value> =
            serde_json::from_value(json!({"query": "q", "model": "client-pick"})).unwrap();
        apply_backend_fields(&mut payload, SearchBackend::Deep);
        assert_eq!(payload["model"], json!("jina-deepsearch-v1"));
        assert_eq!(payload["budget_tokens"], json!(8000));
        assert_eq!(payload["max_returned_urls"], json!(10));
        assert_eq!(payload["reasoning_effort"], json!("high"));
    }

    #[test]
    fn fast_fields_leave_passthrough_untouched() {
        let mut payload: Map<String, Value> =
            serde_json::from_value(json!({"query": "Wetter heute", "locale": "de"})).unwrap();
        apply_backend_fields(&mut payload, SearchBackend::Fast);
        assert_eq!(payload["model"], json!("sonar"));
        assert_eq!(payload["locale"], json!("de"));
        assert!(!payload.contains_key("budget_tokens"));
        assert!(!payload.contains_key("max_returned_urls"));
        assert!(!payload.contains_key("reasoning_effort"));
    }
}
