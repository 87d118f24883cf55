//! # Processor Configuration Module
//!
//! Settings for turning a search result into an article record. The only
//! knob today is the minimum amount of extracted text a page must have before
//! it is worth sending to the analyzer.

/// Value stored for metadata a page does not declare
pub const UNKNOWN: &str = "unknown";

/// Configuration for the article processor
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    /// Pages with fewer extracted characters are dropped
    pub min_content_chars: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 200,
        }
    }
}

/// Builder for ProcessorConfig
#[derive(Debug, Default)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ProcessorConfig::default(),
        }
    }

    /// Set the minimum extracted text length
    pub fn min_content_chars(mut self, min_content_chars: usize) -> Self {
        self.config.min_content_chars = min_content_chars;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ProcessorConfig {
        self.config
    }
}

impl ProcessorConfig {
    /// Create a new builder
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::new()
    }
}
