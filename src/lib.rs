//! # appliance-intel - News Intelligence for Personal-Care Appliances
//!
//! This crate discovers, fetches, analyzes and stores news articles about
//! personal-care small appliances (hair dryers, beauty devices, massagers).
//! It combines a web search API, a chat-completion model and a local SQLite
//! store into a single collection pipeline.
//!
//! ## Features
//!
//! - Prioritized search task planning over a fixed product/topic catalogue
//! - Google Custom Search client with bounded exponential backoff
//! - Page download and readable-text extraction
//! - LLM analysis (category, summary, keywords, business value score) with
//!   tolerant parsing of the model's answer
//! - Append-only article store deduplicated by URL
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use appliance_intel::config::AppConfig;
//! use appliance_intel::pipeline::build_pipeline;
//! use appliance_intel::planner::SearchTaskPlanner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let mut pipeline = build_pipeline(
//!         &config,
//!         SearchTaskPlanner::default(),
//!         config.pipeline_config(),
//!     )
//!     .await?;
//!
//!     let stats = pipeline.run().await?;
//!     println!("{}", stats);
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

pub mod analyzer;
pub mod config;
pub mod fetch;
pub mod pipeline;
pub mod planner;
pub mod processor;
pub mod retry;
pub mod search;
pub mod store;

pub use error::{Error, Result};

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::analyzer::{AnalysisResult, ContentAnalyzer};
    pub use crate::config::AppConfig;
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::pipeline::{CollectionPipeline, PipelineConfig, RunStats};
    pub use crate::planner::{SearchTask, SearchTaskPlanner};
    pub use crate::processor::ArticleProcessor;
    pub use crate::search::{SearchProvider, SearchResult};
    pub use crate::store::{ArticleRecord, ArticleStore};
}
