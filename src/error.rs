//! Error types for the appliance-intel crate

use thiserror::Error;

/// Result type for appliance-intel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for appliance-intel operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Search API error
    #[error("Search error: {0}")]
    Search(String),

    /// Page fetch error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}
