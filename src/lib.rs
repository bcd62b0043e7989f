//! biscrape: incremental harvester for the BankInfoSecurity resource listing
//!
//! This crate crawls the paginated resource index, extracts one metadata
//! record per entry, and appends only newly-seen entries to a CSV table. A
//! persisted cursor (the link of the newest entry ingested by the previous
//! run) and an optional date cutoff bound each run against the unbounded,
//! ever-growing remote listing.

pub mod config;
pub mod crawl;
pub mod decode;
pub mod model;
pub mod store;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("invalid date argument '{0}': expected mm/dd/yyyy")]
    Usage(String),

    #[error("request failed for {url}: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(#[from] decode::DecodeError),

    #[error("persistence error: {0}")]
    Persistence(#[from] store::PersistenceError),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::{Config, DecodePolicy};
pub use crawl::{harvest, CrawlController, HarvestOutcome, StopReason};
pub use model::{Page, Record};
