//! # Application Configuration Module
//!
//! Process-wide settings resolved once at startup and then passed by value
//! into each component. Credentials are required; everything else has a
//! default matching the original scraper's behavior.
//!
//! ## Environment variables
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `GOOGLE_API_KEY` | yes | |
//! | `SEARCH_ENGINE_ID` | yes | |
//! | `DEEPSEEK_API_KEY` | yes | |
//! | `APPLIANCE_INTEL_DB` | no | `news.db` |
//! | `MIN_VALUE_SCORE` | no | `50` |
//! | `REQUEST_TIMEOUT_SECS` | no | `20` |
//! | `RETRY_ATTEMPTS` | no | `3` |
//! | `RETRY_BASE_DELAY_MS` | no | `2000` |
//! | `RESULTS_PER_TASK` | no | `5` |
//! | `ANALYSIS_MODEL` | no | `deepseek-chat` |
//! | `ANALYSIS_REQUESTS_PER_MINUTE` | no | `60` |

use crate::analyzer::AnalyzerConfig;
use crate::error::Error as CrateError;
use crate::fetch::FetcherConfig;
use crate::pipeline::PipelineConfig;
use crate::retry::RetryPolicy;
use std::env::VarError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Variable naming the database file
pub const DATABASE_PATH_VAR: &str = "APPLIANCE_INTEL_DB";

/// Database file used when none is configured
pub const DEFAULT_DATABASE_PATH: &str = "news.db";

/// Database path from `.env` and the environment, without requiring credentials
pub fn database_path_from_env() -> PathBuf {
    dotenvy::dotenv().ok();
    database_path(std::env::var(DATABASE_PATH_VAR).ok())
}

fn database_path(raw: Option<String>) -> PathBuf {
    raw.map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
}

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// A variable is set but cannot be parsed
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnvVar {
        /// Variable name
        var: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl From<ConfigError> for CrateError {
    fn from(err: ConfigError) -> Self {
        CrateError::Config(err.to_string())
    }
}

/// Resolved application settings
#[derive(Clone)]
pub struct AppConfig {
    /// Google Custom Search API key
    pub google_api_key: String,

    /// Google Programmable Search Engine id
    pub search_engine_id: String,

    /// DeepSeek API key for the analysis model
    pub deepseek_api_key: String,

    /// Path of the SQLite database file
    pub database_path: PathBuf,

    /// Articles scoring below this are not stored
    pub min_value_score: i64,

    /// Timeout for each outbound call
    pub request_timeout: Duration,

    /// Total attempts for a rate-limited or failing search call
    pub retry_attempts: u32,

    /// Delay before the first retry
    pub retry_base_delay: Duration,

    /// Search results requested per task
    pub results_per_task: u32,

    /// Chat model used for analysis
    pub analysis_model: String,

    /// Client-side cap on analysis requests
    pub analysis_requests_per_minute: u32,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("google_api_key", &"<redacted>")
            .field("search_engine_id", &self.search_engine_id)
            .field("deepseek_api_key", &"<redacted>")
            .field("database_path", &self.database_path)
            .field("min_value_score", &self.min_value_score)
            .field("request_timeout", &self.request_timeout)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("results_per_task", &self.results_per_task)
            .field("analysis_model", &self.analysis_model)
            .field(
                "analysis_requests_per_minute",
                &self.analysis_requests_per_minute,
            )
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let require = |var: &str| -> Result<String, ConfigError> {
            match lookup(var) {
                Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(ConfigError::MissingEnvVar(var.to_string())),
            }
        };

        // Set-but-blank counts as unset
        let or_default = |var: &str, default: &str| -> String {
            lookup(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        fn parse<T: std::str::FromStr>(var: &str, raw: String) -> Result<T, ConfigError>
        where
            T::Err: fmt::Display,
        {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                })
        }

        let min_value_score: i64 = parse("MIN_VALUE_SCORE", or_default("MIN_VALUE_SCORE", "50"))?;
        if !(0..=100).contains(&min_value_score) {
            return Err(ConfigError::InvalidEnvVar {
                var: "MIN_VALUE_SCORE".to_string(),
                reason: format!("{} is outside 0..=100", min_value_score),
            });
        }

        let retry_attempts: u32 = parse("RETRY_ATTEMPTS", or_default("RETRY_ATTEMPTS", "3"))?;
        if retry_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: "RETRY_ATTEMPTS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let analysis_requests_per_minute: u32 = parse(
            "ANALYSIS_REQUESTS_PER_MINUTE",
            or_default("ANALYSIS_REQUESTS_PER_MINUTE", "60"),
        )?;
        if analysis_requests_per_minute == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: "ANALYSIS_REQUESTS_PER_MINUTE".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            google_api_key: require("GOOGLE_API_KEY")?,
            search_engine_id: require("SEARCH_ENGINE_ID")?,
            deepseek_api_key: require("DEEPSEEK_API_KEY")?,
            database_path: database_path(lookup(DATABASE_PATH_VAR).ok()),
            min_value_score,
            request_timeout: Duration::from_secs(parse(
                "REQUEST_TIMEOUT_SECS",
                or_default("REQUEST_TIMEOUT_SECS", "20"),
            )?),
            retry_attempts,
            retry_base_delay: Duration::from_millis(parse(
                "RETRY_BASE_DELAY_MS",
                or_default("RETRY_BASE_DELAY_MS", "2000"),
            )?),
            results_per_task: parse("RESULTS_PER_TASK", or_default("RESULTS_PER_TASK", "5"))?,
            analysis_model: or_default("ANALYSIS_MODEL", "deepseek-chat"),
            analysis_requests_per_minute,
        })
    }

    /// Create a new builder seeded with the given credentials
    pub fn builder(
        google_api_key: impl Into<String>,
        search_engine_id: impl Into<String>,
        deepseek_api_key: impl Into<String>,
    ) -> AppConfigBuilder {
        AppConfigBuilder::new(google_api_key, search_engine_id, deepseek_api_key)
    }

    /// Retry policy for search calls
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            base_delay: self.retry_base_delay,
            ..RetryPolicy::default()
        }
    }

    /// Page fetcher settings
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::builder().timeout(self.request_timeout).build()
    }

    /// Analyzer settings
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig::builder()
            .timeout(self.request_timeout.saturating_mul(2))
            .build()
    }

    /// Pipeline settings
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::builder()
            .min_value_score(self.min_value_score)
            .results_per_task(self.results_per_task)
            .retry_policy(self.retry_policy())
            .build()
    }
}

/// Builder for AppConfig
#[derive(Debug)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Create a new builder with default settings and the given credentials
    pub fn new(
        google_api_key: impl Into<String>,
        search_engine_id: impl Into<String>,
        deepseek_api_key: impl Into<String>,
    ) -> Self {
        Self {
            config: AppConfig {
                google_api_key: google_api_key.into(),
                search_engine_id: search_engine_id.into(),
                deepseek_api_key: deepseek_api_key.into(),
                database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
                min_value_score: 50,
                request_timeout: Duration::from_secs(20),
                retry_attempts: 3,
                retry_base_delay: Duration::from_secs(2),
                results_per_task: 5,
                analysis_model: "deepseek-chat".to_string(),
                analysis_requests_per_minute: 60,
            },
        }
    }

    /// Set the database path
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = path.into();
        self
    }

    /// Set the minimum value score for persistence
    pub fn min_value_score(mut self, score: i64) -> Self {
        self.config.min_value_score = score;
        self
    }

    /// Set the per-call timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the retry attempt cap
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_attempts = attempts;
        self
    }

    /// Set the delay before the first retry
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.config.retry_base_delay = delay;
        self
    }

    /// Set the number of search results per task
    pub fn results_per_task(mut self, results: u32) -> Self {
        self.config.results_per_task = results;
        self
    }

    /// Set the analysis model name
    pub fn analysis_model(mut self, model: impl Into<String>) -> Self {
        self.config.analysis_model = model.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> AppConfig {
        self.config
    }
}
