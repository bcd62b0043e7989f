//! Listing pagination
//!
//! `PageSource` is the pull-based sequence abstraction the controller
//! consumes: a lazy, in-order sequence of listing pages, fetched and decoded
//! one at a time, never pre-fetched in bulk. The sequence is infinite in
//! principle; the controller treats a page with zero links as end-of-input.
//!
//! A paginator is not restartable mid-sequence. Each run starts fresh at
//! page 1, which is correct because the remote listing only ever grows at
//! the front and the cursor or date boundary bounds re-processing.

use crate::crawl::fetcher::fetch_html;
use crate::decode::decode_listing;
use crate::model::Page;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;

/// A lazy sequence of listing pages.
///
/// The trait seam exists so the crawl loop can be tested against an injected
/// fixed sequence of pages without any network access.
#[async_trait]
pub trait PageSource {
    /// Produces the next listing page, fetching and decoding on demand.
    async fn next_page(&mut self) -> Result<Page>;
}

/// Real paginator over the remote listing index
pub struct Paginator {
    client: Client,
    listing_base: String,
    next_index: u32,
}

impl Paginator {
    /// Starts a fresh sequence at page index 1.
    pub fn new(client: Client, listing_base: impl Into<String>) -> Self {
        Self {
            client,
            listing_base: listing_base.into(),
            next_index: 1,
        }
    }
}

#[async_trait]
impl PageSource for Paginator {
    async fn next_page(&mut self) -> Result<Page> {
        let url = format!("{}{}", self.listing_base, self.next_index);
        tracing::debug!("fetching listing page {}", url);

        let html = fetch_html(&self.client, &url).await?;
        // Malformed listing markup is fatal; there is no partial-page recovery.
        let page = decode_listing(&html, &url)?;

        self.next_index += 1;
        Ok(page)
    }
}
