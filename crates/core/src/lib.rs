//! Crate for Weiche, a small CORS relay for browser clients talking to chat
//! and search backends.

#[cfg(feature = "rustls-tls")]
#[cfg(feature = "native-tls")]
compile_error!("You can only enable one TLS backend");

pub extern crate url;

mod error;
mod http_client;
mod middleware;
mod routes;
mod upstream;

pub use error::UpstreamError;

use anyhow::Result;
use axum::{Router, middleware as axum_middleware, routing::post};
use core::{net::SocketAddr, time::Duration};
use http_client::{BuildHttpClientArgs, HttpClient, build_http_client};
use routes::{CHAT_ENDPOINT, DEEP_SEARCH_ENDPOINT, FAST_SEARCH_ENDPOINT, SMART_SEARCH_ENDPOINT};
use tokio::{net::TcpListener, signal};
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{self, TraceLayer},
};
use tracing::{Level, info};
use url::Url;

/// A relay server that forwards browser requests to remote chat and search
/// backends with permissive CORS headers attached.
#[derive(Debug, Clone)]
pub struct WeicheServer {
    router_inner: Router,
}

/// Settings to run the Weiche server with.
#[derive(Debug, Clone)]
pub struct WeicheServerSettings {
    /// How many seconds that can elapse before an incoming request is
    /// abandoned for taking too long.
    ///
    /// Must be larger than the deep-search upstream timeout, otherwise
    /// deep-search requests are cut off before the upstream can answer.
    pub request_timeout: u64,

    /// See [`UpstreamSettings`].
    pub upstream_settings: UpstreamSettings,
}

/// Configuration options used when making calls to the upstream backends.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// URL of the chat-completion backend.
    pub chat_url: Url,

    /// URL of the fast-search backend.
    pub fast_search_url: Url,

    /// URL of the deep-research backend.
    pub deep_search_url: Url,

    /// Value sent as the `x-api-key` header on chat requests.
    pub chat_api_key: String,

    /// How many seconds to wait for the chat and fast-search backends.
    pub search_timeout: u64,

    /// How many seconds to wait for the deep-research backend.
    pub deep_search_timeout: u64,

    /// Whether to allow invalid/expired/forged TLS certificates when making
    /// upstream requests.
    ///
    /// **Enabling this is dangerous and is usually not necessary.**
    pub allow_invalid_certs: bool,

    /// The maximum amount of redirects to follow when making a request to an
    /// upstream server before abandoning the request.
    pub max_redirects: usize,
}

impl Default for WeicheServerSettings {
    fn default() -> Self {
        Self {
            request_timeout: 180,
            upstream_settings: UpstreamSettings::default(),
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            chat_url: Url::parse("https://glmproxy.ccpn.cc/v1/messages")
                .expect("default chat url should parse"),
            fast_search_url: Url::parse("https://api.perplexity.ai/chat/completions")
                .expect("default fast-search url should parse"),
            deep_search_url: Url::parse("https://deepsearch.jina.ai/v1/chat/completions")
                .expect("default deep-search url should parse"),
            chat_api_key: String::from("dummy-key"),
            search_timeout: 30,
            deep_search_timeout: 120,
            allow_invalid_certs: false,
            max_redirects: 10,
        }
    }
}

#[derive(Debug, Clone)]
struct AppState {
    client: HttpClient,
    settings: WeicheServerSettings,
}

impl WeicheServer {
    /// Create a new server with the provided settings.
    pub fn new(settings: WeicheServerSettings) -> Result<Self> {
        info!(
            chat = %settings.upstream_settings.chat_url,
            fast_search = %settings.upstream_settings.fast_search_url,
            deep_search = %settings.upstream_settings.deep_search_url,
            "Configured upstream backends"
        );
        let router = Router::new()
            .route(CHAT_ENDPOINT, post(routes::chat_handler))
            .route(FAST_SEARCH_ENDPOINT, post(routes::fast_search_handler))
            .route(DEEP_SEARCH_ENDPOINT, post(routes::deep_search_handler))
            .route(SMART_SEARCH_ENDPOINT, post(routes::smart_search_handler))
            .fallback(routes::not_found_handler)
            .method_not_allowed_fallback(routes::not_found_handler)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(TimeoutLayer::new(Duration::from_secs(
                settings.request_timeout,
            )))
            .layer(CatchPanicLayer::new())
            .layer(axum_middleware::from_fn(middleware::cors_middleware))
            .with_state(AppState {
                client: build_http_client(BuildHttpClientArgs {
                    allow_invalid_certs: settings.upstream_settings.allow_invalid_certs,
                    max_redirects: settings.upstream_settings.max_redirects,
                })?,
                settings,
            });

        Ok(Self {
            router_inner: router,
        })
    }

    /// The assembled [`Router`], for embedding into another application or
    /// driving directly in tests.
    pub fn router(&self) -> Router {
        self.router_inner.clone()
    }

    /// Start the server and expose it locally on the provided [`SocketAddr`].
    pub async fn start(self, address: &SocketAddr) -> Result<()> {
        let tcp_listener = TcpListener::bind(&address).await?;
        info!("Listening on http://{}", tcp_listener.local_addr()?);
        axum::serve(tcp_listener, self.router_inner)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await?;
        Ok(())
    }

    // https://github.com/tokio-rs/axum/blob/15917c6dbcb4a48707a20e9cfd021992a279a662/examples/graceful-shutdown/src/main.rs#L55
    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }
}
