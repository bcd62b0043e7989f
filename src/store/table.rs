//! Table sink: append-only CSV store for accepted records
//!
//! Rows are appended strictly after the last existing row, never rewritten
//! or reordered. The fixed header row is fabricated exactly once, when the
//! store is created (or explicitly reset). Each row derives its cells from
//! one `Record` plus two constants, the source label and the region label.

use crate::model::Record;
use crate::store::{PersistenceError, StoreResult};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Fixed first cell of every data row
pub const SOURCE_LABEL: &str = "BankInfoSecurity from ISMG";

/// Fixed last cell of every data row
pub const REGION_LABEL: &str = "US";

const HEADER: [&str; 7] = [
    "Platform",
    "Asset",
    "Asset link",
    "Company",
    "Type",
    "Date Posted",
    "Region",
];

/// Dates are written back the way the site prints them
const DATE_FORMAT: &str = "%B %-d, %Y";

/// Appends accepted records to the CSV table
#[derive(Debug)]
pub struct TableSink {
    path: PathBuf,
}

impl TableSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncates the store; the next append fabricates a fresh header.
    pub fn reset(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// Appends `records` in the order given.
    ///
    /// On an absent or empty store the header row is written first. The data
    /// is flushed and synced before this returns, so the cursor only ever
    /// advances past rows that are durably on disk.
    pub fn append(&self, records: &[Record]) -> StoreResult<()> {
        let fresh = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        let mut writer = BufWriter::new(file);

        if fresh {
            write_row(&mut writer, &HEADER).map_err(|source| self.io_error(source))?;
        }

        for record in records {
            let date = record.posted_date.format(DATE_FORMAT).to_string();
            let row = [
                SOURCE_LABEL,
                &record.asset_name,
                &record.link,
                &record.company_name,
                &record.asset_type,
                &date,
                REGION_LABEL,
            ];
            write_row(&mut writer, &row).map_err(|source| self.io_error(source))?;
        }

        writer.flush().map_err(|source| self.io_error(source))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

/// Writes one CSV row with minimal quoting (quotes doubled inside quoted cells)
fn write_row<W: Write>(writer: &mut W, cells: &[&str]) -> std::io::Result<()> {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        if needs_quotes(cell) {
            write!(writer, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(writer, "{cell}")?;
        }
    }
    writeln!(writer)
}
