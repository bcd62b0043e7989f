//! Persistent stores for the harvest
//!
//! Two stores survive between runs:
//! - `CursorStore`: a single-line text file naming the newest entry already
//!   ingested by a prior run
//! - `TableSink`: the append-only CSV table of accepted records
//!
//! The commit protocol appends to the table first and advances the cursor
//! second, so a crash between the two degrades to safe re-ingestion on the
//! next run rather than silent loss.

mod cursor;
mod table;

pub use cursor::CursorStore;
pub use table::{TableSink, REGION_LABEL, SOURCE_LABEL};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the cursor and table stores
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, PersistenceError>;
