use anyhow::Result;
use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;
use weiche::{UpstreamSettings, WeicheServer, WeicheServerSettings, url::Url};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightMagenta.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightMagenta.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about, styles = styles())]
struct AppOptions {
    /// The socket address that the local relay should be hosted on.
    #[arg(long = "address", env = "WEICHE_ADDRESS", default_value = "0.0.0.0:8001")]
    address: SocketAddr,

    /// The maximum lifetime of an incoming request before it is forcefully
    /// terminated (in seconds). Must exceed the deep-search timeout.
    #[arg(
        long = "request-timeout",
        env = "WEICHE_REQUEST_TIMEOUT",
        default_value_t = 180
    )]
    request_timeout: u64,

    /// URL of the chat-completion backend.
    #[arg(
        long = "chat-upstream-url",
        env = "WEICHE_CHAT_UPSTREAM_URL",
        default_value = "https://glmproxy.ccpn.cc/v1/messages"
    )]
    chat_upstream_url: Url,

    /// Value sent as the `x-api-key` header to the chat backend.
    #[arg(
        long = "chat-api-key",
        env = "WEICHE_CHAT_API_KEY",
        default_value = "dummy-key"
    )]
    chat_api_key: String,

    /// URL of the fast-search backend.
    #[arg(
        long = "fast-search-upstream-url",
        env = "WEICHE_FAST_SEARCH_UPSTREAM_URL",
        default_value = "https://api.perplexity.ai/chat/completions"
    )]
    fast_search_upstream_url: Url,

    /// URL of the deep-research backend.
    #[arg(
        long = "deep-search-upstream-url",
        env = "WEICHE_DEEP_SEARCH_UPSTREAM_URL",
        default_value = "https://deepsearch.jina.ai/v1/chat/completions"
    )]
    deep_search_upstream_url: Url,

    /// How many seconds to wait for the chat and fast-search backends before
    /// giving up on a request.
    #[arg(
        long = "search-timeout",
        env = "WEICHE_SEARCH_TIMEOUT",
        default_value_t = 30
    )]
    search_timeout: u64,

    /// How many seconds to wait for the deep-research backend before giving
    /// up on a request.
    #[arg(
        long = "deep-search-timeout",
        env = "WEICHE_DEEP_SEARCH_TIMEOUT",
        default_value_t = 120
    )]
    deep_search_timeout: u64,

    /// DANGEROUS: Allow self-signed/invalid/forged TLS certificates when
    /// making upstream requests.
    #[arg(
        long = "upstream-allow-invalid-certs",
        env = "WEICHE_UPSTREAM_ALLOW_INVALID_CERTS",
        default_value_t = false
    )]
    upstream_allow_invalid_certs: bool,

    /// The maximum amount of redirects to follow when making upstream requests.
    #[arg(
        long = "upstream-max-redirects",
        env = "WEICHE_UPSTREAM_MAX_REDIRECTS",
        default_value_t = 10
    )]
    upstream_max_redirects: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info")))
        .init();
    let args = AppOptions::parse();

    if args.upstream_allow_invalid_certs {
        println!(
            "WARNING: Running with 'upstream_allow_invalid_certs' will allow upstreams with Invalid/Forged/No TLS certificates to be used, be careful."
        );
    }

    WeicheServer::new(WeicheServerSettings {
        request_timeout: args.request_timeout,
        upstream_settings: UpstreamSettings {
            chat_url: args.chat_upstream_url,
            fast_search_url: args.fast_search_upstream_url,
            deep_search_url: args.deep_search_upstream_url,
            chat_api_key: args.chat_api_key,
            search_timeout: args.search_timeout,
            deep_search_timeout: args.deep_search_timeout,
            allow_invalid_certs: args.upstream_allow_invalid_certs,
            max_redirects: args.upstream_max_redirects,
        },
    })?
    .start(&args.address)
    .await
}
