//! Run configuration
//!
//! Everything the crawl needs beyond the CLI surface itself: where the
//! listing lives, where the table and cursor are persisted, the optional
//! date cutoff, and what to do when an entry page fails to decode. One
//! `Config` value is built per invocation and handed to the controller and
//! stores at construction.

use crate::HarvestError;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Listing URL prefix; the paginator appends the 1-based page index.
pub const DEFAULT_LISTING_BASE: &str = "https://www.bankinfosecurity.com/resources/p-";

/// Default table store
pub const DEFAULT_TABLE_PATH: &str = "assets.csv";

/// Default cursor store
pub const DEFAULT_CURSOR_PATH: &str = "stop_link.txt";

/// What to do when an entry page fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Abort the run with no commit (default; matches the source behavior)
    FailFast,
    /// Log a warning and move on to the next entry
    SkipAndLog,
}

/// Configuration for one harvest run
#[derive(Debug, Clone)]
pub struct Config {
    /// Listing URL prefix, completed by the page index
    pub listing_base: String,

    /// Destination CSV table
    pub table_path: PathBuf,

    /// Single-line cursor file
    pub cursor_path: PathBuf,

    /// Truncate the table and rewrite the header before this run
    pub reset_table: bool,

    /// Optional cutoff: entries strictly older than this stop the crawl
    pub date_limit: Option<NaiveDate>,

    /// Entry decode failure handling
    pub decode_policy: DecodePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_base: DEFAULT_LISTING_BASE.to_string(),
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            cursor_path: PathBuf::from(DEFAULT_CURSOR_PATH),
            reset_table: false,
            date_limit: None,
            decode_policy: DecodePolicy::FailFast,
        }
    }
}

/// Parses the positional date argument.
///
/// The accepted format is `mm/dd/yyyy`; anything else is a usage error and
/// must be rejected before any network activity.
pub fn parse_date_limit(raw: &str) -> Result<NaiveDate, HarvestError> {
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").map_err(|_| HarvestError::Usage(raw.to_string()))
}
