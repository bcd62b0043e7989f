//! Crawl controller - the core incremental harvest state machine
//!
//! Drives the page source, feeds each link to the record source, evaluates
//! the stop conditions, and commits the accepted records once, at the very
//! end. Because nothing is persisted mid-run, a killed or failed run leaves
//! the cursor and table exactly as the previous run left them.
//!
//! Stop conditions, in the mode determined at invocation:
//! - no date limit: stop when a link equals the persisted cursor
//! - date limit supplied: stop when an entry is strictly older than the
//!   limit; cursor equality is not independently checked in this mode, so a
//!   date-limited run re-ingests everything down to the date boundary even
//!   past a previously recorded cursor

use crate::config::DecodePolicy;
use crate::crawl::paginator::PageSource;
use crate::crawl::records::RecordSource;
use crate::model::Record;
use crate::store::{CursorStore, TableSink};
use crate::{HarvestError, Result};
use chrono::NaiveDate;

/// Why a run stopped accepting entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A link matched the cursor from the previous run
    CursorMatch,
    /// An entry was strictly older than the supplied date limit
    DateExceeded,
    /// A listing page yielded no links
    Exhausted,
}

/// Final result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// Accepted records were appended and the cursor advanced
    Saved { count: usize, reason: StopReason },
    /// Nothing was accepted; no append, cursor unchanged
    NothingNew { reason: StopReason },
}

/// Drives one harvest run to completion
pub struct CrawlController<P, R> {
    pages: P,
    records: R,
    cursor: CursorStore,
    table: TableSink,
    date_limit: Option<NaiveDate>,
    decode_policy: DecodePolicy,
}

impl<P: PageSource, R: RecordSource> CrawlController<P, R> {
    pub fn new(
        pages: P,
        records: R,
        cursor: CursorStore,
        table: TableSink,
        date_limit: Option<NaiveDate>,
        decode_policy: DecodePolicy,
    ) -> Self {
        Self {
            pages,
            records,
            cursor,
            table,
            date_limit,
            decode_policy,
        }
    }

    /// Runs the crawl: pull pages, fetch records, evaluate stop conditions,
    /// then commit.
    ///
    /// Accepted records are a contiguous newest-first prefix of the remote
    /// listing as of crawl start; the record that triggers a stop condition
    /// is itself excluded. Commit appends the rows first and advances the
    /// cursor second.
    pub async fn run(&mut self) -> Result<HarvestOutcome> {
        let stop_link = self.cursor.read();
        let mut accepted: Vec<Record> = Vec::new();

        let reason = 'crawl: loop {
            let page = self.pages.next_page().await?;
            if page.is_empty() {
                break StopReason::Exhausted;
            }

            for link in &page.links {
                // Cursor equality only halts the crawl when no date limit is
                // supplied, and is checked before the fetch: the matching
                // entry was ingested last run and never needs a remote read.
                if self.date_limit.is_none() && stop_link.as_deref() == Some(link.as_str()) {
                    break 'crawl StopReason::CursorMatch;
                }

                let record = match self.records.fetch(link).await {
                    Ok(record) => record,
                    Err(HarvestError::Decode(e))
                        if self.decode_policy == DecodePolicy::SkipAndLog =>
                    {
                        tracing::warn!("skipping {}: {}", link, e);
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                if let Some(limit) = self.date_limit {
                    if record.posted_date < limit {
                        break 'crawl StopReason::DateExceeded;
                    }
                }

                accepted.push(record);
                tracing::info!("fetched {}: {}", accepted.len(), link);
            }
        };

        if accepted.is_empty() {
            tracing::info!("nothing new ({:?})", reason);
            return Ok(HarvestOutcome::NothingNew { reason });
        }

        // Append before advancing the cursor: a crash between the two steps
        // re-ingests on the next run rather than losing rows.
        self.table.append(&accepted)?;
        self.cursor.write(&accepted[0].link)?;

        Ok(HarvestOutcome::Saved {
            count: accepted.len(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::model::Page;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::path::Path;

    /// Serves a fixed sequence of pages, then empty pages forever.
    struct FixedPages {
        pages: VecDeque<Page>,
    }

    impl FixedPages {
        fn new(pages: Vec<Vec<&str>>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|links| Page {
                        links: links.into_iter().map(String::from).collect(),
                    })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PageSource for FixedPages {
        async fn next_page(&mut self) -> Result<Page> {
            Ok(self.pages.pop_front().unwrap_or_default())
        }
    }

    /// Serves canned records; unknown links decode-fail.
    struct CannedRecords {
        records: HashMap<String, Record>,
    }

    impl CannedRecords {
        fn new(records: Vec<Record>) -> Self {
            Self {
                records: records.into_iter().map(|r| (r.link.clone(), r)).collect(),
            }
        }
    }

    #[async_trait]
    impl RecordSource for CannedRecords {
        async fn fetch(&self, link: &str) -> Result<Record> {
            self.records.get(link).cloned().ok_or_else(|| {
                HarvestError::Decode(DecodeError::MissingElement {
                    selector: "a.article-title__link".to_string(),
                    url: link.to_string(),
                })
            })
        }
    }

    fn record(link: &str, date: NaiveDate) -> Record {
        Record {
            asset_name: format!("asset {link}"),
            company_name: "Acme Security".to_string(),
            posted_date: date,
            asset_type: "Whitepaper".to_string(),
            link: link.to_string(),
        }
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    /// Five-entry listing, newest first, all posted in January 2024.
    fn five_entry_site() -> (FixedPages, CannedRecords) {
        let links = ["l5", "l4", "l3", "l2", "l1"];
        let pages = FixedPages::new(vec![links.to_vec()]);
        let records = CannedRecords::new(
            links
                .iter()
                .enumerate()
                .map(|(i, link)| record(link, jan(25 - i as u32)))
                .collect(),
        );
        (pages, records)
    }

    fn stores(dir: &Path) -> (CursorStore, TableSink) {
        (
            CursorStore::new(dir.join("stop_link.txt")),
            TableSink::new(dir.join("assets.csv")),
        )
    }

    fn table_links(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1) // header
            .map(|line| line.split(',').nth(2).unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_stop_at_cursor_accepts_newest_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());
        cursor.write("l2").unwrap();

        let (pages, records) = five_entry_site();
        let mut controller =
            CrawlController::new(pages, records, cursor, table, None, DecodePolicy::FailFast);

        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::Saved {
                count: 3,
                reason: StopReason::CursorMatch
            }
        );
        assert_eq!(table_links(&dir.path().join("assets.csv")), ["l5", "l4", "l3"]);
        assert_eq!(
            CursorStore::new(dir.path().join("stop_link.txt")).read(),
            Some("l5".to_string())
        );
    }

    #[tokio::test]
    async fn test_first_run_without_cursor_accepts_everything() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());

        let (pages, records) = five_entry_site();
        let mut controller =
            CrawlController::new(pages, records, cursor, table, None, DecodePolicy::FailFast);

        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::Saved {
                count: 5,
                reason: StopReason::Exhausted
            }
        );
        assert_eq!(
            CursorStore::new(dir.path().join("stop_link.txt")).read(),
            Some("l5".to_string())
        );
    }

    #[tokio::test]
    async fn test_date_limit_stops_at_boundary_regardless_of_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());
        // A cursor pointing at the second entry must not halt a date-limited run.
        cursor.write("l4").unwrap();

        let pages = FixedPages::new(vec![vec!["l5", "l4", "l3"]]);
        let records = CannedRecords::new(vec![
            record("l5", jan(10)),
            record("l4", jan(5)),
            record("l3", NaiveDate::from_ymd_opt(2023, 12, 20).unwrap()),
        ]);
        let mut controller = CrawlController::new(
            pages,
            records,
            cursor,
            table,
            Some(jan(1)),
            DecodePolicy::FailFast,
        );

        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::Saved {
                count: 2,
                reason: StopReason::DateExceeded
            }
        );
        assert_eq!(table_links(&dir.path().join("assets.csv")), ["l5", "l4"]);
        assert_eq!(
            CursorStore::new(dir.path().join("stop_link.txt")).read(),
            Some("l5".to_string())
        );
    }

    #[tokio::test]
    async fn test_entry_on_limit_date_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());

        let pages = FixedPages::new(vec![vec!["l1"]]);
        let records = CannedRecords::new(vec![record("l1", jan(1))]);
        let mut controller = CrawlController::new(
            pages,
            records,
            cursor,
            table,
            Some(jan(1)),
            DecodePolicy::FailFast,
        );

        // Only entries strictly older than the limit stop the crawl.
        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::Saved {
                count: 1,
                reason: StopReason::Exhausted
            }
        );
    }

    #[tokio::test]
    async fn test_cursor_on_first_link_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());
        cursor.write("l5").unwrap();

        let (pages, records) = five_entry_site();
        let mut controller =
            CrawlController::new(pages, records, cursor, table, None, DecodePolicy::FailFast);

        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::NothingNew {
                reason: StopReason::CursorMatch
            }
        );
        assert!(!dir.path().join("assets.csv").exists());
        assert_eq!(
            CursorStore::new(dir.path().join("stop_link.txt")).read(),
            Some("l5".to_string())
        );
    }

    #[tokio::test]
    async fn test_empty_remote_listing_is_nothing_new() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());

        let pages = FixedPages::new(vec![]);
        let records = CannedRecords::new(vec![]);
        let mut controller =
            CrawlController::new(pages, records, cursor, table, None, DecodePolicy::FailFast);

        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::NothingNew {
                reason: StopReason::Exhausted
            }
        );
        assert!(!dir.path().join("assets.csv").exists());
        assert_eq!(CursorStore::new(dir.path().join("stop_link.txt")).read(), None);
    }

    #[tokio::test]
    async fn test_accepts_across_page_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());
        cursor.write("l1").unwrap();

        let pages = FixedPages::new(vec![vec!["l5", "l4"], vec!["l3", "l2"], vec!["l1"]]);
        let records = CannedRecords::new(
            ["l5", "l4", "l3", "l2", "l1"]
                .iter()
                .enumerate()
                .map(|(i, link)| record(link, jan(25 - i as u32)))
                .collect(),
        );
        let mut controller =
            CrawlController::new(pages, records, cursor, table, None, DecodePolicy::FailFast);

        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::Saved {
                count: 4,
                reason: StopReason::CursorMatch
            }
        );
        assert_eq!(
            table_links(&dir.path().join("assets.csv")),
            ["l5", "l4", "l3", "l2"]
        );
    }

    #[tokio::test]
    async fn test_decode_failure_aborts_without_commit() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());

        let pages = FixedPages::new(vec![vec!["l3", "broken", "l1"]]);
        // "broken" has no canned record, so fetching it decode-fails.
        let records = CannedRecords::new(vec![record("l3", jan(3)), record("l1", jan(1))]);
        let mut controller =
            CrawlController::new(pages, records, cursor, table, None, DecodePolicy::FailFast);

        let err = controller.run().await.unwrap_err();
        assert!(matches!(err, HarvestError::Decode(_)));
        assert!(!dir.path().join("assets.csv").exists());
        assert_eq!(CursorStore::new(dir.path().join("stop_link.txt")).read(), None);
    }

    #[tokio::test]
    async fn test_skip_policy_logs_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let (cursor, table) = stores(dir.path());

        let pages = FixedPages::new(vec![vec!["l3", "broken", "l1"]]);
        let records = CannedRecords::new(vec![record("l3", jan(3)), record("l1", jan(1))]);
        let mut controller =
            CrawlController::new(pages, records, cursor, table, None, DecodePolicy::SkipAndLog);

        let outcome = controller.run().await.unwrap();
        assert_eq!(
            outcome,
            HarvestOutcome::Saved {
                count: 2,
                reason: StopReason::Exhausted
            }
        );
        assert_eq!(table_links(&dir.path().join("assets.csv")), ["l3", "l1"]);
    }
}
