//! # Search Error Types Module
//!
//! Errors surfaced by the search adapter. The split matters to the caller:
//! quota and transient failures are retried under the run's retry policy,
//! while invalid requests and unexpected responses abandon the task at once.

use crate::error::Error as CrateError;
use crate::retry::Retryable;
use thiserror::Error;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// The provider reported a rate limit or exhausted quota
    #[error("Search quota exceeded: {message}")]
    QuotaExceeded {
        /// Provider message
        message: String,
        /// Seconds suggested by a Retry-After header, if any
        retry_after_secs: Option<u64>,
    },

    /// Network failure, timeout, or server-side error
    #[error("Transient search error: {0}")]
    Transient(String),

    /// The provider rejected the request itself
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),

    /// The provider answered with a body we cannot read
    #[error("Unexpected search response: {0}")]
    UnexpectedResponse(String),
}

impl Retryable for SearchError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::QuotaExceeded { .. } | SearchError::Transient(_)
        )
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::UnexpectedResponse(err.to_string())
        } else if err.is_builder() {
            SearchError::InvalidRequest(err.to_string())
        } else {
            SearchError::Transient(err.to_string())
        }
    }
}

impl From<SearchError> for CrateError {
    fn from(err: SearchError) -> Self {
        CrateError::Search(err.to_string())
    }
}
