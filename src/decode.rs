//! HTML decoders for listing and entry pages
//!
//! This module is the markup boundary of the crawler. It turns raw HTML into
//! the two shapes the controller works with:
//! - a listing page's markup into the ordered entry links (`Page`)
//! - an entry page's markup into one metadata `Record`
//!
//! The selectors match the source site's markup: listing entries live under
//! `h2.title.top-none`, the entry title under `a.article-title__link`, the
//! company and date inside `span.article-byline`, and the asset type on the
//! `a#dld_btn` download button.

use crate::model::{Page, Record};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;
use url::Url;

/// Errors from decoding fetched markup
///
/// Every variant names the page URL it came from, so a fatal decode error in
/// the middle of a run points at the offending entry.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid selector '{0}'")]
    Selector(String),

    #[error("missing element '{selector}' in {url}")]
    MissingElement { selector: String, url: String },

    #[error("anchor without href under '{selector}' in {url}")]
    MissingHref { selector: String, url: String },

    #[error("unresolvable link '{href}' in {url}")]
    BadLink { href: String, url: String },

    #[error("unparseable date '{text}' in {url}")]
    BadDate { text: String, url: String },
}

/// Result type for decode operations
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

const LISTING_ENTRY_SELECTOR: &str = "h2.title.top-none > a";
const TITLE_SELECTOR: &str = "a.article-title__link";
const BYLINE_SELECTOR: &str = "span.article-byline";
const DOWNLOAD_SELECTOR: &str = "a#dld_btn";

/// Byline dates look like "March 5, 2024"
const DATE_FORMAT: &str = "%B %d, %Y";

fn selector(s: &str) -> DecodeResult<Selector> {
    Selector::parse(s).map_err(|_| DecodeError::Selector(s.to_string()))
}

fn missing(selector: &str, url: &str) -> DecodeError {
    DecodeError::MissingElement {
        selector: selector.to_string(),
        url: url.to_string(),
    }
}

/// Decodes one listing page into its ordered entry links.
///
/// Zero matching entries yields an empty `Page`, which the controller treats
/// as remote exhaustion, not an error. Relative hrefs are resolved against
/// the listing page's own URL. An entry anchor without an `href` attribute,
/// or with one that cannot be resolved, is malformed markup and fails the
/// decode.
pub fn decode_listing(html: &str, page_url: &str) -> DecodeResult<Page> {
    let base = Url::parse(page_url).map_err(|_| DecodeError::BadLink {
        href: page_url.to_string(),
        url: page_url.to_string(),
    })?;
    let document = Html::parse_document(html);
    let entry_selector = selector(LISTING_ENTRY_SELECTOR)?;

    let mut links = Vec::new();
    for anchor in document.select(&entry_selector) {
        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| DecodeError::MissingHref {
                selector: LISTING_ENTRY_SELECTOR.to_string(),
                url: page_url.to_string(),
            })?;
        let resolved = base
            .join(href.trim())
            .map_err(|_| DecodeError::BadLink {
                href: href.to_string(),
                url: page_url.to_string(),
            })?;
        links.push(resolved.to_string());
    }

    Ok(Page { links })
}

/// Decodes one entry page into a `Record`.
///
/// Any missing element or unparseable date is a `DecodeError`; the caller
/// decides whether that aborts the run or skips the entry.
pub fn decode_resource(html: &str, link: &str) -> DecodeResult<Record> {
    let document = Html::parse_document(html);

    let asset_name = element_text(&document, TITLE_SELECTOR, link)?;

    let byline_selector = selector(BYLINE_SELECTOR)?;
    let byline = document
        .select(&byline_selector)
        .next()
        .ok_or_else(|| missing(BYLINE_SELECTOR, link))?;
    let (company_name, date_text) = split_byline(byline, link)?;

    let posted_date = NaiveDate::parse_from_str(date_text.trim(), DATE_FORMAT).map_err(|_| {
        DecodeError::BadDate {
            text: date_text.trim().to_string(),
            url: link.to_string(),
        }
    })?;

    let asset_type = strip_download_verb(&element_text(&document, DOWNLOAD_SELECTOR, link)?);

    Ok(Record {
        asset_name,
        company_name,
        posted_date,
        asset_type,
        link: link.to_string(),
    })
}

/// Collected, trimmed text of the first element matching `sel`
fn element_text(document: &Html, sel: &str, url: &str) -> DecodeResult<String> {
    let parsed = selector(sel)?;
    document
        .select(&parsed)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing(sel, url))
}

/// Splits the byline span into (company, date text).
///
/// The byline is structured as a leading text node ("• Company") followed by
/// a child element holding the date, so this walks the span's direct children
/// rather than using selectors.
fn split_byline(byline: ElementRef<'_>, url: &str) -> DecodeResult<(String, String)> {
    let mut company = None;
    let mut date_text = None;

    for child in byline.children() {
        match child.value() {
            Node::Text(text) => {
                let cleaned = text
                    .trim_matches(|c: char| c.is_whitespace() || c == '\u{2022}')
                    .to_string();
                if company.is_none() && !cleaned.is_empty() {
                    company = Some(cleaned);
                }
            }
            Node::Element(_) => {
                if date_text.is_none() {
                    date_text =
                        ElementRef::wrap(child).map(|element| element.text().collect::<String>());
                }
            }
            _ => {}
        }
    }

    match (company, date_text) {
        (Some(company), Some(date)) => Ok((company, date)),
        _ => Err(missing(BYLINE_SELECTOR, url)),
    }
}

/// Download buttons read "Download Whitepaper", "Download Handbook", ...;
/// only the noun is the asset type.
fn strip_download_verb(label: &str) -> String {
    label
        .trim()
        .strip_prefix("Download")
        .unwrap_or(label)
        .trim()
        .to_string()
}
