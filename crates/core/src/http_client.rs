use anyhow::Result;
use reqwest::redirect::Policy;
use std::time::Duration;

pub type HttpClient = reqwest::Client;

pub struct BuildHttpClientArgs {
    pub allow_invalid_certs: bool,
    pub max_redirects: usize,
}

/// Create a new [`HttpClient`] with the given arguments.
///
/// No overall request timeout is set here as each route supplies its own
/// per-request deadline when forwarding.
pub fn build_http_client(args: BuildHttpClientArgs) -> Result<HttpClient> {
    Ok(reqwest::ClientBuilder::default()
        .redirect(Policy::limited(args.max_redirects))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .danger_accept_invalid_certs(args.allow_invalid_certs)
        .connect_timeout(Duration::from_secs(5))
        .build()?)
}
