//! Error types for the processor module
//!
//! Every variant is a reason to drop the article; none of them stop a run.

use crate::analyzer::AnalysisError;
use crate::fetch::FetchError;
use thiserror::Error;

/// Why a search result did not become an article record
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The URL belongs to a blacklisted domain
    #[error("Blacklisted URL: {0}")]
    Blacklisted(String),

    /// The page could not be downloaded or parsed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Too little text was extracted to be worth analyzing
    #[error("Content too short: {chars} chars (minimum {min})")]
    ContentTooShort {
        /// Characters extracted
        chars: usize,
        /// Configured minimum
        min: usize,
    },

    /// The analyzer failed or its answer could not be used
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    /// The analyzer judged the article off-topic
    #[error("Irrelevant article: {0}")]
    Irrelevant(String),
}

impl ProcessError {
    /// Short label for logs
    pub fn reason(&self) -> &'static str {
        match self {
            ProcessError::Blacklisted(_) => "blacklisted",
            ProcessError::Fetch(e) if e.is_timeout() => "fetch_timeout",
            ProcessError::Fetch(_) => "fetch",
            ProcessError::ContentTooShort { .. } => "too_short",
            ProcessError::Analysis(_) => "analysis",
            ProcessError::Irrelevant(_) => "irrelevant",
        }
    }
}
