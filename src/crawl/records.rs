//! Per-entry record fetching
//!
//! Resolves one entry link to one `Record`: exactly one GET and one decode
//! per call, no caching across calls within a run.

use crate::crawl::fetcher::fetch_html;
use crate::decode::decode_resource;
use crate::model::Record;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Resolves entry links to records.
///
/// Injectable for the same reason as `PageSource`: the controller's stop
/// logic is tested against canned records, not the network.
#[async_trait]
pub trait RecordSource {
    async fn fetch(&self, link: &str) -> Result<Record>;
}

/// Real record fetcher over the remote entry pages
pub struct RecordFetcher {
    client: Client,
}

impl RecordFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for RecordFetcher {
    async fn fetch(&self, link: &str) -> Result<Record> {
        let html = fetch_html(&self.client, link).await?;
        Ok(decode_resource(&html, link)?)
    }
}
