//! Content extraction functionality for the fetch module
//!
//! Best-effort heuristics over raw HTML: the article body is read from the
//! first `article`/`main` region (falling back to `body`), and metadata comes
//! from the usual `<meta>` tags. Anything missing is left as `None`.

use crate::fetch::PageMetadata;
use crate::fetch::error::FetchError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::warn;
use url::Url;

const ROOT_SELECTORS: &[&str] = &["article", "main", "[role='main']", "body"];
const BLOCK_SELECTOR: &str = "h1, h2, h3, h4, p, li, blockquote, pre";

const TITLE_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[property='og:title']", Some("content")),
    ("meta[name='twitter:title']", Some("content")),
    ("title", None),
    ("h1", None),
];
const DESCRIPTION_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[name='description']", Some("content")),
    ("meta[property='og:description']", Some("content")),
];
const AUTHOR_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[name='author']", Some("content")),
    ("meta[property='article:author']", Some("content")),
    ("meta[name='byl']", Some("content")),
    ("[rel='author']", None),
    ("[itemprop='author']", None),
];
const PUBLISHED_SELECTORS: &[(&str, Option<&str>)] = &[
    ("meta[property='article:published_time']", Some("content")),
    ("meta[name='pubdate']", Some("content")),
    ("meta[name='publishdate']", Some("content")),
    ("meta[name='date']", Some("content")),
    ("meta[itemprop='datePublished']", Some("content")),
    ("time[datetime]", Some("datetime")),
];

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector)
        .map_err(|e| FetchError::HtmlParse(format!("Failed to parse selector '{}': {}", selector, e)))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty value among the candidate selectors, read either from an
/// attribute or from the element text
fn first_match(
    document: &Html,
    candidates: &[(&str, Option<&str>)],
) -> Result<Option<String>, FetchError> {
    for (selector, attr) in candidates {
        let selector = parse_selector(selector)?;
        for element in document.select(&selector) {
            let value = match attr {
                Some(attr) => element.value().attr(attr).map(collapse_whitespace),
                None => Some(collapse_whitespace(&element.text().collect::<String>())),
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                return Ok(Some(value));
            }
        }
    }
    Ok(None)
}

/// Extract the readable text of a page
///
/// # Arguments
///
/// * `html` - The HTML of the page
/// * `exclude_selectors` - CSS selectors for elements whose text is ignored
///
/// # Returns
///
/// Paragraph-separated plain text
pub fn extract_text(html: &str, exclude_selectors: &[String]) -> Result<String, FetchError> {
    let document = Html::parse_document(html);

    let mut excluded = HashSet::new();
    for selector_str in exclude_selectors {
        match Selector::parse(selector_str) {
            Ok(selector) => {
                for element in document.select(&selector) {
                    excluded.insert(element.id());
                }
            }
            Err(e) => {
                warn!("Failed to parse selector '{}': {}", selector_str, e);
            }
        }
    }

    let is_excluded = |element: &ElementRef| {
        excluded.contains(&element.id()) || element.ancestors().any(|a| excluded.contains(&a.id()))
    };

    let block_selector = parse_selector(BLOCK_SELECTOR)?;
    for root_selector in ROOT_SELECTORS {
        let root_selector = parse_selector(root_selector)?;
        let Some(root) = document
            .select(&root_selector)
            .find(|element| !is_excluded(element))
        else {
            continue;
        };

        let mut blocks: Vec<String> = Vec::new();
        for block in root.select(&block_selector) {
            if is_excluded(&block) {
                continue;
            }
            // Nested blocks (li > p) are already covered by their outer block
            if block
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|a| a.id() != root.id())
                .any(|a| block_selector.matches(&a))
            {
                continue;
            }
            let text = collapse_whitespace(&block.text().collect::<String>());
            if !text.is_empty() {
                blocks.push(text);
            }
        }

        if blocks.is_empty() {
            let text = collapse_whitespace(
                &root
                    .descendants()
                    .filter_map(|node| {
                        let parent_excluded = node
                            .ancestors()
                            .any(|a| excluded.contains(&a.id()));
                        if parent_excluded {
                            None
                        } else {
                            node.value().as_text().map(|t| t.to_string())
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            if text.is_empty() {
                continue;
            }
            return Ok(text);
        }

        return Ok(blocks.join("\n\n"));
    }

    Ok(String::new())
}

/// Extract metadata from a page
///
/// # Arguments
///
/// * `url` - The URL of the page
/// * `html` - The HTML of the page
///
/// # Returns
///
/// The extracted metadata
pub fn extract_metadata(url: &str, html: &str) -> Result<PageMetadata, FetchError> {
    let document = Html::parse_document(html);

    let parsed_url = Url::parse(url)?;
    let domain = parsed_url
        .host_str()
        .ok_or_else(|| FetchError::HtmlParse(format!("URL has no host: {}", url)))?
        .trim_start_matches("www.")
        .to_string();

    let title = first_match(&document, TITLE_SELECTORS)?;
    let description = first_match(&document, DESCRIPTION_SELECTORS)?;
    let author = first_match(&document, AUTHOR_SELECTORS)?;
    let published = first_match(&document, PUBLISHED_SELECTORS)?;
    let publication_date = published.as_deref().and_then(normalize_publish_date);

    Ok(PageMetadata {
        title,
        description,
        publication_date,
        author,
        domain,
    })
}

/// Parse a publication timestamp in any of the common formats into a date
///
/// Handles RFC 3339 (`2024-05-02T08:00:00Z`), RFC 2822, bare dates and
/// slash-separated dates; otherwise looks for the first `YYYY-MM-DD`-like
/// pattern in the string.
pub fn normalize_publish_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    static DATE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = DATE_PATTERN
        .get_or_init(|| Regex::new(r"(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})").ok())
        .as_ref()?;
    let captures = pattern.captures(raw)?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let day = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
