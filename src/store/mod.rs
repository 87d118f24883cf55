//! Article store module
//!
//! This module owns the append-only `articles` table. URLs are unique, and a
//! second save of the same URL is reported as skipped rather than failing.

mod database;
pub mod error;
mod schema;

pub use database::ArticleStore;
pub use error::StoreError;

use serde::{Deserialize, Serialize};

/// Separator used when keywords are serialized into a single text column
pub const KEYWORD_SEPARATOR: &str = ", ";

/// An analyzed article ready to be persisted, or read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Row id, assigned by the database
    pub id: Option<i64>,

    /// Title of the article
    pub title: String,

    /// URL of the article, unique across the store
    pub url: String,

    /// Originating domain
    pub source: String,

    /// Publication date as `YYYY-MM-DD`, or "unknown"
    pub publish_date: String,

    /// Author, or "unknown"
    pub author: String,

    /// Category assigned by the analyzer
    pub category: String,

    /// Product line or topic the article belongs to
    pub sub_category: String,

    /// Short summary of the article
    pub summary: String,

    /// Ordered keywords
    pub keywords: Vec<String>,

    /// Business value score in 0..=100
    pub value_score: i64,

    /// One-line justification for the score
    pub value_reason: String,

    /// Insert timestamp, set by the database
    pub created_at: Option<String>,
}

impl ArticleRecord {
    /// Keywords joined into the stored text form
    ///
    /// A comma inside a keyword would split it on read, so it is dropped.
    pub fn keywords_text(&self) -> String {
        self.keywords
            .iter()
            .map(|k| k.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join(KEYWORD_SEPARATOR)
    }
}

/// Split a stored keyword column back into its ordered list
pub fn split_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Result of an insert-or-ignore save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Whether a new row was written
    pub inserted: bool,

    /// Id of the new row when one was written
    pub id: Option<i64>,
}

impl SaveOutcome {
    /// A save that wrote the row with the given id
    pub fn inserted(id: i64) -> Self {
        Self {
            inserted: true,
            id: Some(id),
        }
    }

    /// A save skipped because the URL already exists
    pub fn duplicate() -> Self {
        Self {
            inserted: false,
            id: None,
        }
    }
}
