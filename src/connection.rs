//! Internal module for building the session-scoped HTTP client.
//!
//! Supports both direct connections and SOCKS5 proxy connections.

use crate::config::TempMailConfig;
use crate::error::{Error, Result};
use reqwest::{Client, Proxy};
use tracing::{debug, instrument};

/// User agent sent with every provider request.
const USER_AGENT: &str = concat!("tempmail-verify/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by all requests of one mailbox client.
#[instrument(
    name = "connection::build_http_client",
    skip_all,
    fields(proxy_enabled = config.proxy.is_some())
)]
pub(crate) fn build_http_client(config: &TempMailConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .connect_timeout(config.timeouts.connect)
        .timeout(config.timeouts.request)
        .user_agent(USER_AGENT);

    if let Some(proxy) = &config.proxy {
        debug!(proxy = %proxy, "Routing requests via SOCKS5 proxy");

        let proxy_url = proxy.url()?;
        let proxy = Proxy::all(proxy_url.as_str()).map_err(|source| Error::HttpClient { source })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|source| Error::HttpClient { source })
}
