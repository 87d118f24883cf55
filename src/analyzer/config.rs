//! # Analyzer Configuration Module
//!
//! Controls how much article text is sent to the model, how long a single
//! analysis may take, and the sampling temperature.

use std::time::Duration;

/// Configuration for the content analyzer
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Upper bound for one completion call
    pub timeout: Duration,

    /// Article text is cut to this many characters before prompting
    pub max_input_chars: usize,

    /// Sampling temperature
    pub temperature: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(40),
            max_input_chars: 3000,
            temperature: 0.1,
        }
    }
}

/// Builder for AnalyzerConfig
#[derive(Debug, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
        }
    }

    /// Set the completion timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the input truncation length
    pub fn max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.config.max_input_chars = max_input_chars;
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AnalyzerConfig {
        self.config
    }
}

impl AnalyzerConfig {
    /// Create a new builder
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::new()
    }
}
