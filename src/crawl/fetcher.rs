//! HTTP transport
//!
//! One client, one GET per call, no retries. A bounded timeout keeps a hung
//! remote from stalling the run forever; any network failure or non-success
//! status aborts the crawl, which commits nothing.

use crate::{HarvestError, Result};
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("biscrape/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by the paginator and record fetcher
pub fn build_http_client() -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one URL and returns its body.
///
/// Non-2xx statuses and network failures are both fatal transport errors
/// carrying the URL they happened on.
pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| HarvestError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|source| HarvestError::Transport {
            url: url.to_string(),
            source,
        })
}
