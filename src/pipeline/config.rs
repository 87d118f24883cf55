//! # Pipeline Configuration Module
//!
//! Thresholds and pacing for one collection run.

use crate::retry::RetryPolicy;
use std::time::Duration;

/// Configuration for a collection run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Articles scoring below this are not saved
    pub min_value_score: i64,

    /// Search results requested per task
    pub results_per_task: u32,

    /// Retry policy for search calls
    pub retry_policy: RetryPolicy,

    /// Stop after this many tasks
    pub max_tasks: Option<usize>,

    /// Pause between consecutive tasks
    pub task_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_value_score: 50,
            results_per_task: 5,
            retry_policy: RetryPolicy::default(),
            max_tasks: None,
            task_delay: Duration::from_secs(1),
        }
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the minimum value score to persist
    pub fn min_value_score(mut self, min_value_score: i64) -> Self {
        self.config.min_value_score = min_value_score;
        self
    }

    /// Set the number of results requested per task
    pub fn results_per_task(mut self, results_per_task: u32) -> Self {
        self.config.results_per_task = results_per_task;
        self
    }

    /// Set the search retry policy
    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.config.retry_policy = retry_policy;
        self
    }

    /// Limit the number of tasks run
    pub fn max_tasks(mut self, max_tasks: Option<usize>) -> Self {
        self.config.max_tasks = max_tasks;
        self
    }

    /// Set the pause between tasks
    pub fn task_delay(mut self, task_delay: Duration) -> Self {
        self.config.task_delay = task_delay;
        self
    }

    /// Build the configuration
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl PipelineConfig {
    /// Create a new builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Check the values a run cannot proceed without
    pub fn validate(&self) -> Result<(), String> {
        if !(0..=100).contains(&self.min_value_score) {
            return Err(format!(
                "min_value_score must be within 0..=100, got {}",
                self.min_value_score
            ));
        }
        if self.results_per_task == 0 {
            return Err("results_per_task must be at least 1".to_string());
        }
        Ok(())
    }
}
