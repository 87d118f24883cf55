//! Error types for the pipeline module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Errors that stop a run before it starts
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The run settings are inconsistent
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),
}

impl From<PipelineError> for CrateError {
    fn from(err: PipelineError) -> Self {
        CrateError::Pipeline(err.to_string())
    }
}
