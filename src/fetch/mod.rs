//! # Page Fetch Module
//!
//! Downloads an article page and turns it into plain text plus whatever
//! metadata the page declares about itself.
//!
//! ## Key Components
//!
//! - `PageFetcher`: the seam the article processor depends on
//! - `HttpPageFetcher`: the reqwest-backed implementation
//! - `FetchedPage`: extracted text and metadata of one page
//! - Content extraction utilities for converting HTML to clean text

mod config;
mod content_extraction;
mod error;
mod http_fetcher;

pub use config::{FetcherConfig, FetcherConfigBuilder};
pub use content_extraction::{extract_metadata, extract_text, normalize_publish_date};
pub use error::FetchError;
pub use http_fetcher::HttpPageFetcher;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A downloaded page reduced to text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// URL of the page after redirects
    pub url: String,

    /// Readable text of the page
    pub text: String,

    /// Metadata extracted from the page
    pub metadata: PageMetadata,
}

/// Metadata declared by a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Title of the page
    pub title: Option<String>,

    /// Description of the page
    pub description: Option<String>,

    /// Publication date of the page
    pub publication_date: Option<NaiveDate>,

    /// Author of the page
    pub author: Option<String>,

    /// Domain of the page, without a leading `www.`
    pub domain: String,
}

/// Something that can download a page and extract its text
pub trait PageFetcher {
    /// Download the page at `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}
