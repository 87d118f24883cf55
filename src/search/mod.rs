//! Search module
//!
//! This module turns a [`SearchTask`] into a page of web search results. The
//! [`SearchProvider`] trait is the seam the pipeline depends on; the Google
//! Custom Search adapter is the production implementation.

mod error;
mod google;

pub use error::SearchError;
pub use google::{GoogleSearchClient, MAX_PAGE_SIZE};

use crate::planner::SearchTask;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::instrument;

/// One result returned by the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Title of the result
    pub title: String,

    /// URL of the result
    pub url: String,

    /// Snippet shown by the search engine
    pub snippet: String,

    /// Domain as displayed by the search engine
    pub display_link: Option<String>,

    /// Publication time found in the result's page metadata
    pub published_time: Option<String>,

    /// Author found in the result's page metadata
    pub author: Option<String>,
}

impl SearchResult {
    /// Create a result with only the required fields
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            display_link: None,
            published_time: None,
            author: None,
        }
    }
}

/// A web search backend
pub trait SearchProvider {
    /// Run one search for the task, returning at most `page_size` results
    fn search(
        &self,
        task: &SearchTask,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;
}

/// Run a search under the given retry policy
///
/// Quota and transient errors are retried with backoff; any other error, or
/// the last error once the attempt cap is reached, is returned.
#[instrument(skip(provider, policy), fields(query = %task.query))]
pub async fn search_with_retry<P>(
    provider: &P,
    task: &SearchTask,
    page_size: u32,
    policy: &RetryPolicy,
) -> Result<Vec<SearchResult>, SearchError>
where
    P: SearchProvider + Sync,
{
    policy.run(|_| provider.search(task, page_size)).await
}
