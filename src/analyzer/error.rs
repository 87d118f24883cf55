//! Error types for the analyzer module

use std::time::Duration;
use thiserror::Error;

/// Error type for content analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The completion service failed or returned no text
    #[error("Analysis service error: {0}")]
    Service(String),

    /// The response did not contain a usable analysis object
    #[error("Failed to parse analysis response: {0}")]
    Parse(String),

    /// The value score was numeric but outside 0..=100
    #[error("Value score {0} is outside 0..=100")]
    ScoreOutOfRange(i64),

    /// The completion call did not finish in time
    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),
}

impl AnalysisError {
    /// Whether the response arrived but could not be used
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            AnalysisError::Parse(_) | AnalysisError::ScoreOutOfRange(_)
        )
    }
}

impl From<rig::completion::CompletionError> for AnalysisError {
    fn from(err: rig::completion::CompletionError) -> Self {
        AnalysisError::Service(err.to_string())
    }
}
