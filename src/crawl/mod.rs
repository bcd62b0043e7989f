//! Crawl module: pagination, record fetching, and the run controller
//!
//! Control flow: the controller pulls listing pages from the `PageSource`,
//! feeds each link to the `RecordSource`, evaluates the stop conditions, and
//! commits once at the end - append accepted rows to the table, then advance
//! the cursor to the newest accepted link.

mod controller;
mod fetcher;
mod paginator;
mod records;

pub use controller::{CrawlController, HarvestOutcome, StopReason};
pub use fetcher::{build_http_client, fetch_html};
pub use paginator::{PageSource, Paginator};
pub use records::{RecordFetcher, RecordSource};

use crate::config::Config;
use crate::store::{CursorStore, TableSink};
use crate::Result;

/// Runs one complete harvest against the configured listing.
///
/// Wires the real paginator, record fetcher, cursor store and table sink
/// together and drives the controller to completion. Everything is strictly
/// sequential: one listing fetch, then one record fetch per link, in order.
pub async fn harvest(config: &Config) -> Result<HarvestOutcome> {
    let client = build_http_client()?;

    let table = TableSink::new(&config.table_path);
    if config.reset_table {
        table.reset()?;
    }
    let cursor = CursorStore::new(&config.cursor_path);

    let paginator = Paginator::new(client.clone(), &config.listing_base);
    let records = RecordFetcher::new(client);

    let mut controller = CrawlController::new(
        paginator,
        records,
        cursor,
        table,
        config.date_limit,
        config.decode_policy,
    );
    controller.run().await
}
