use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Answers preflight requests and stamps permissive CORS headers onto every
/// response.
///
/// Runs as the outermost layer so that error responses, 404s and panics
/// caught further down the stack carry the headers too. `OPTIONS` requests
/// to any path are answered here directly with an empty 200 and never reach
/// the router.
pub async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        append_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    append_cors_headers(response.headers_mut());
    response
}

fn append_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type, x-api-key"),
    );
    headers.insert("Access-Control-Max-Age", HeaderValue::from_static("86400"));
}
