//! Article processor module
//!
//! Turns one search result into an [`ArticleRecord`]: download the page,
//! extract its text and metadata, ask the analyzer for category, summary and
//! value score, and assemble the record. Any failure along the way is a
//! [`ProcessError`] naming why the result was dropped.

mod config;
mod error;

pub use config::{ProcessorConfig, ProcessorConfigBuilder, UNKNOWN};
pub use error::ProcessError;

use crate::analyzer::{AnalysisResult, ContentAnalyzer, OTHER_CATEGORY};
use crate::fetch::{FetchedPage, PageFetcher, normalize_publish_date};
use crate::planner::{INDUSTRY_NEWS, SearchTask, is_blacklisted};
use crate::search::SearchResult;
use crate::store::ArticleRecord;
use rig::completion::CompletionModel;
use tracing::{debug, instrument};
use url::Url;

/// Fetches, analyzes and assembles articles
pub struct ArticleProcessor<F, M>
where
    F: PageFetcher,
    M: CompletionModel,
{
    fetcher: F,
    analyzer: ContentAnalyzer<M>,
    config: ProcessorConfig,
}

impl<F, M> ArticleProcessor<F, M>
where
    F: PageFetcher,
    M: CompletionModel,
{
    /// Create a processor
    pub fn new(fetcher: F, analyzer: ContentAnalyzer<M>, config: ProcessorConfig) -> Self {
        Self {
            fetcher,
            analyzer,
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process a search result with no task context
    pub async fn process(&self, result: &SearchResult) -> Result<ArticleRecord, ProcessError> {
        self.process_with_hint(result, None).await
    }

    /// Process a search result found by `task`
    ///
    /// The task's sub-category is kept on the record unless the task is a
    /// site-targeted one, in which case the analyzer's product line is used.
    pub async fn process_for_task(
        &self,
        result: &SearchResult,
        task: &SearchTask,
    ) -> Result<ArticleRecord, ProcessError> {
        self.process_with_hint(result, Some(&task.sub_category))
            .await
    }

    #[instrument(skip(self, result), fields(url = %result.url))]
    async fn process_with_hint(
        &self,
        result: &SearchResult,
        sub_category_hint: Option<&str>,
    ) -> Result<ArticleRecord, ProcessError> {
        if is_blacklisted(&result.url) {
            return Err(ProcessError::Blacklisted(result.url.clone()));
        }

        let page = self.fetcher.fetch(&result.url).await?;

        let chars = page.text.chars().count();
        if chars < self.config.min_content_chars {
            return Err(ProcessError::ContentTooShort {
                chars,
                min: self.config.min_content_chars,
            });
        }

        let title = pick_title(result, &page);
        let analysis = self.analyzer.analyze(&title, &page.text).await?;
        if analysis.is_irrelevant() {
            return Err(ProcessError::Irrelevant(result.url.clone()));
        }

        debug!(
            "Analyzed '{}' as {} with score {}",
            title, analysis.category, analysis.value_score
        );
        Ok(assemble(result, &page, title, analysis, sub_category_hint))
    }
}

fn pick_title(result: &SearchResult, page: &FetchedPage) -> String {
    [page.metadata.title.as_deref(), Some(result.title.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Domain of the result: the search engine's display link, or the URL host
fn source_of(result: &SearchResult) -> String {
    result
        .display_link
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| {
            Url::parse(&result.url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
        })
        .map(|d| d.trim_start_matches("www.").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn assemble(
    result: &SearchResult,
    page: &FetchedPage,
    title: String,
    analysis: AnalysisResult,
    sub_category_hint: Option<&str>,
) -> ArticleRecord {
    // Search-result hints win over what the page declares
    let publish_date = result
        .published_time
        .as_deref()
        .and_then(normalize_publish_date)
        .or(page.metadata.publication_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let author = [result.author.as_deref(), page.metadata.author.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|a| !a.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string();

    let sub_category = match sub_category_hint.map(str::trim) {
        Some(hint) if !hint.is_empty() && hint != INDUSTRY_NEWS => hint.to_string(),
        hint => {
            if !analysis.sub_category.is_empty() {
                analysis.sub_category
            } else {
                hint.filter(|h| !h.is_empty())
                    .unwrap_or(OTHER_CATEGORY)
                    .to_string()
            }
        }
    };

    ArticleRecord {
        id: None,
        title,
        url: result.url.clone(),
        source: source_of(result),
        publish_date,
        author,
        category: analysis.category,
        sub_category,
        summary: analysis.summary,
        keywords: analysis.keywords,
        value_score: analysis.value_score,
        value_reason: analysis.value_reason,
        created_at: None,
    }
}
