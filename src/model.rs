//! Data model for harvested entries
//!
//! Two shapes flow through the crawl: `Page`, the ordered links decoded from
//! one listing page, and `Record`, the metadata decoded from one entry page.

use chrono::NaiveDate;

/// Metadata extracted from a single resource entry page.
///
/// A record is immutable once constructed; its identity is the `link`,
/// which the source keeps unique and stable per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Title of the asset (whitepaper, handbook, webinar, ...)
    pub asset_name: String,

    /// Company credited in the byline
    pub company_name: String,

    /// Publication date from the byline
    pub posted_date: NaiveDate,

    /// Asset type as labelled on the download button
    pub asset_type: String,

    /// Absolute URL of the entry page
    pub link: String,
}

/// The ordered entry links decoded from one listing page.
///
/// Order is significant: the source publishes newest-first, and the crawl
/// relies on that to treat accepted records as a contiguous newest-first
/// prefix of the remote listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub links: Vec<String>,
}

impl Page {
    /// A page with no links signals remote exhaustion to the controller.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
