//! # LLM Client Module
//!
//! Builds the completion model used for article analysis, wrapped in a
//! rate limiter so a long collection run stays inside the provider quota.
//!
//! ## Key Components
//!
//! - `deepseek_model`: the production DeepSeek chat model behind a limiter
//! - `RateLimitedCompletionModel`: a wrapper that adds rate limiting to any completion model
//! - `MockCompletionModel`: a scriptable model for tests

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_completion::RateLimitedCompletionModel;
use rig::{completion::CompletionModel, providers::deepseek};

use crate::config::{AppConfig, ConfigError};

pub mod mock_model;
pub mod ratelimited_completion;

/// Wrapped provider response
pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

/// Build the rate-limited DeepSeek model described by the configuration
pub fn deepseek_model(
    config: &AppConfig,
) -> Result<RateLimitedCompletionModel<impl CompletionModel + use<>>, ConfigError> {
    let per_minute = NonZeroU32::new(config.analysis_requests_per_minute).ok_or_else(|| {
        ConfigError::InvalidEnvVar {
            var: "ANALYSIS_REQUESTS_PER_MINUTE".to_string(),
            reason: "must be at least 1".to_string(),
        }
    })?;

    let client = deepseek::Client::new(&config.deepseek_api_key);
    let limiter = RateLimiter::direct(Quota::per_minute(per_minute));
    Ok(RateLimitedCompletionModel::new(
        client.completion_model(&config.analysis_model),
        limiter,
    ))
}
