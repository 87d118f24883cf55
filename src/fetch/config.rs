//! # Fetcher Configuration Module
//!
//! Settings for downloading article pages: the per-request timeout, the
//! user agent, and which page regions are ignored when extracting text. A
//! builder is provided for overriding individual settings.

use std::time::Duration;

/// Configuration for the page fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Timeout for a single page download
    pub timeout: Duration,

    /// User agent to use for requests
    pub user_agent: String,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// CSS selectors for elements to exclude from the extracted text
    pub exclude_selectors: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            max_redirects: 5,
            exclude_selectors: vec![
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "aside".to_string(),
                "form".to_string(),
                ".navigation".to_string(),
                ".menu".to_string(),
                ".sidebar".to_string(),
                ".ads".to_string(),
                ".comments".to_string(),
                "#comments".to_string(),
            ],
        }
    }
}

/// Builder for FetcherConfig
#[derive(Debug, Default)]
pub struct FetcherConfigBuilder {
    config: FetcherConfig,
}

impl FetcherConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetcherConfig::default(),
        }
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the maximum number of redirects
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.max_redirects = max_redirects;
        self
    }

    /// Set the CSS selectors for elements to exclude
    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    /// Build the configuration
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}

impl FetcherConfig {
    /// Create a new builder
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = FetcherConfig::builder()
            .timeout(Duration::from_secs(3))
            .user_agent("test-agent")
            .max_redirects(1)
            .exclude_selectors(vec!["nav".to_string()])
            .build();

        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.max_redirects, 1);
        assert_eq!(config.exclude_selectors, vec!["nav".to_string()]);
    }

    #[test]
    fn test_default_excludes_boilerplate() {
        let config = FetcherConfig::default();
        assert!(config.exclude_selectors.iter().any(|s| s == "script"));
        assert!(config.exclude_selectors.iter().any(|s| s == "footer"));
    }
}
