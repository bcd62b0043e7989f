//! Cursor store: the single "last processed link" marker
//!
//! A one-line text file holding the URI of the newest entry ingested by the
//! previous run. Read once at crawl start; overwritten once at crawl end,
//! and only when the run accepted at least one new record.

use crate::store::{PersistenceError, StoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads and writes the persisted crawl cursor
#[derive(Debug)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cursor, or `None` when no previous run has written one.
    ///
    /// An absent or unreadable store degrades to an empty cursor rather than
    /// an error: the crawl then runs until natural exhaustion or a date
    /// limit, which only re-ingests, never loses.
    pub fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let link = contents.lines().next().unwrap_or("").trim().to_string();
                if link.is_empty() {
                    None
                } else {
                    Some(link)
                }
            }
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("cursor store {} unreadable: {}", self.path.display(), e);
                }
                None
            }
        }
    }

    /// Overwrites the cursor with the link of the newest accepted record.
    pub fn write(&self, link: &str) -> StoreResult<()> {
        fs::write(&self.path, format!("{link}\n")).map_err(|source| PersistenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_store_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::new(dir.path().join("stop_link.txt"));
        assert_eq!(store.read(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::new(dir.path().join("stop_link.txt"));
        store.write("https://example.com/whitepapers/a-1").unwrap();
        assert_eq!(
            store.read().as_deref(),
            Some("https://example.com/whitepapers/a-1")
        );
    }

    #[test]
    fn test_write_overwrites_previous_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let store = CursorStore::new(dir.path().join("stop_link.txt"));
        store.write("https://example.com/a").unwrap();
        store.write("https://example.com/b").unwrap();
        assert_eq!(store.read().as_deref(), Some("https://example.com/b"));
    }

    #[test]
    fn test_trailing_newline_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop_link.txt");
        std::fs::write(&path, "https://example.com/a\n\n").unwrap();
        let store = CursorStore::new(path);
        assert_eq!(store.read().as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_empty_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop_link.txt");
        std::fs::write(&path, "").unwrap();
        let store = CursorStore::new(path);
        assert_eq!(store.read(), None);
    }
}
