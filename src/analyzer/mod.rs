//! # Content Analyzer Module
//!
//! Sends article text to a chat completion model and turns the free-text
//! answer into a structured [`AnalysisResult`]: category, product line,
//! summary, keywords and a 0..=100 business value score with its reason.
//!
//! The analyzer never retries. A response that cannot be read after the single
//! repair pass in [`parse`] is reported as an [`AnalysisError`] and the caller
//! drops the article.

mod config;
mod error;
pub mod parse;
mod prompt;

pub use config::{AnalyzerConfig, AnalyzerConfigBuilder};
pub use error::AnalysisError;
pub use parse::{CATEGORIES, IRRELEVANT_CATEGORY, OTHER_CATEGORY, SUB_CATEGORIES, parse_analysis};
pub use prompt::{ANALYSIS_PREAMBLE, analysis_prompt, truncate_chars};

use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Structured result of analyzing one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// One of [`CATEGORIES`], or [`OTHER_CATEGORY`]
    pub category: String,

    /// Product line named by the model, possibly empty
    pub sub_category: String,

    /// Short summary of the article
    pub summary: String,

    /// Cleaned keyword list
    pub keywords: Vec<String>,

    /// Business value, 0..=100
    pub value_score: i64,

    /// One-sentence justification of the score
    pub value_reason: String,
}

impl AnalysisResult {
    /// Whether the model judged the article off-topic
    pub fn is_irrelevant(&self) -> bool {
        self.category == IRRELEVANT_CATEGORY
    }
}

/// Analyzes article text with a completion model
#[derive(Clone)]
pub struct ContentAnalyzer<M: CompletionModel> {
    model: M,
    config: AnalyzerConfig,
}

impl<M> ContentAnalyzer<M>
where
    M: CompletionModel,
{
    /// Create an analyzer over the given model
    pub fn new(model: M, config: AnalyzerConfig) -> Self {
        Self { model, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one article
    ///
    /// # Arguments
    ///
    /// * `title` - Title of the article
    /// * `text` - Extracted article text, truncated before prompting
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn analyze(&self, title: &str, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let text = truncate_chars(text, self.config.max_input_chars);
        let prompt = analysis_prompt(title, text);

        let request = self
            .model
            .completion_request(prompt)
            .preamble(ANALYSIS_PREAMBLE.to_string())
            .temperature(self.config.temperature)
            .send();

        let response = tokio::time::timeout(self.config.timeout, request)
            .await
            .map_err(|_| {
                warn!("Analysis timed out after {:?}", self.config.timeout);
                AnalysisError::Timeout(self.config.timeout)
            })??;

        let content = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect::<Vec<String>>()
            .join("\n");

        if content.trim().is_empty() {
            return Err(AnalysisError::Service("empty response".to_string()));
        }
        debug!("Received analysis response of length {}", content.len());

        parse_analysis(&content)
    }
}
