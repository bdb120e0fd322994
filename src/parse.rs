use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use scraper::{Html, Selector};

use crate::{Error, Result, BASE_URL};

/// One page of the review-listing endpoint, scanned out of its JS payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReviewIds {
    pub review_ids: Vec<u64>,
    /// The listing's own `"<from>-<to> of <total>"` fragment.
    /// Empty when the payload doesn't carry one.
    pub progress: String,
    pub is_last_page: bool,
}

impl ParsedReviewIds {
    /// Total review count taken from the progress fragment.
    pub fn total_reviews(&self) -> Option<usize> {
        let (_, total) = self.progress.rsplit_once(" of ")?;
        total.parse().ok()
    }
}

/// A single review page: the book it belongs to and its reading timeline,
/// keyed by the date of each update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReview {
    pub book_url: String,
    pub updates: BTreeMap<String, String>,
}

/// Scans one review-listing payload for review ids, the paging progress and
/// whether a further page exists. The endpoint answers with JS that embeds
/// the listing HTML as an escaped string, so this scans text instead of
/// parsing a document.
pub fn review_ids(js_text: &str) -> Result<ParsedReviewIds> {
    let text = unescape_js(js_text);

    let id_pattern = create_regex(r"/review/show/(\d+)")?;
    let mut seen = HashSet::new();
    let mut review_ids = Vec::new();
    for caps in id_pattern.captures_iter(&text) {
        if let Ok(id) = caps[1].parse::<u64>() {
            // A review can show up twice while the site reshuffles pages.
            if seen.insert(id) {
                review_ids.push(id);
            }
        }
    }

    let progress_pattern = create_regex(r"([\d,]+)\s*[-–]\s*([\d,]+)\s+of\s+([\d,]+)")?;
    let progress = progress_pattern
        .captures(&text)
        .map(|caps| {
            format!(
                "{}-{} of {}",
                caps[1].replace(',', ""),
                caps[2].replace(',', ""),
                caps[3].replace(',', "")
            )
        })
        .unwrap_or_default();

    // The last page renders the next-page control as a disabled <span>.
    let next_pattern = create_regex(r#"<a[^>]+class="next_page""#)?;
    let is_last_page = !next_pattern.is_match(&text);

    Ok(ParsedReviewIds {
        review_ids,
        progress,
        is_last_page,
    })
}

/// Parses a review page, extracting the book link and the reading-timeline
/// rows as a date to event map.
pub fn review(html: &str) -> Result<ParsedReview> {
    let doc = Html::parse_document(html);

    // Create selectors.
    let title_selector = create_selector("a.bookTitle")?;
    let row_selector = create_selector("div.readingTimeline__row")?;
    let date_selector = create_selector("span.readingTimeline__fullDate")?;
    let text_selector = create_selector("div.readingTimeline__text")?;

    let href = doc
        .select(&title_selector)
        .next()
        .ok_or(Error::ParseMissingElement("a.bookTitle"))?
        .value()
        .attr("href")
        .ok_or(Error::ParseMissingElement("a.bookTitle[href]"))?;
    let book_url = if href.starts_with('/') {
        format!("{BASE_URL}{href}")
    } else {
        href.to_string()
    };

    let mut updates = BTreeMap::new();
    for row in doc.select(&row_selector) {
        let Some(date_span) = row.select(&date_selector).next() else {
            continue;
        };
        let date = date_span.text().collect::<String>().trim().to_string();
        let Some(text_div) = row.select(&text_selector).next() else {
            continue;
        };
        let event = fmt_event(&text_div.text().collect::<String>(), &date);
        if !event.is_empty() {
            updates.insert(date, event);
        }
    }

    Ok(ParsedReview { book_url, updates })
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseInvalidSelector(sel_str.into()))
}

#[inline]
fn create_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|_| Error::ParseInvalidPattern(pattern.into()))
}

/// Undoes the JS string escapes that matter for scanning the listing payload.
#[inline]
fn unescape_js(text: &str) -> String {
    text.replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace("\\/", "/")
        .replace("\\u003c", "<")
        .replace("\\u003e", ">")
        .replace("\\u0026", "&")
}

/// Strips the date span and the leading separator out of a timeline row,
/// collapsing the whitespace the markup leaves behind.
fn fmt_event(raw: &str, date: &str) -> String {
    raw.replace(date, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_start_matches(['–', '—', '-', ' '])
        .trim()
        .to_string()
}
