//! Configuration for the advisory workflow.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a dealflow session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealflowConfig {
    /// Root directory for pipeline output artifacts.
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// Subdirectory (under the root) for per-company financial artifacts.
    #[serde(default = "default_fmp_subdir")]
    pub fmp_subdir: String,
    /// Interval between reconciler poll ticks, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,
    /// Debounce window for filesystem notifications, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub watcher_debounce_ms: u64,
    /// Number of model-call attempts before the elicitation fallback applies.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,
    /// Timeout for a single pipeline stage call, in seconds.
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_seconds: f64,
    /// Fixed number of milestone tasks in a pipeline run.
    #[serde(default = "default_total_tasks")]
    pub total_tasks: usize,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_fmp_subdir() -> String {
    "fmp_data".to_string()
}

fn default_poll_interval() -> f64 {
    3.0
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_retry_budget() -> u32 {
    3
}

fn default_stage_timeout() -> f64 {
    300.0
}

fn default_total_tasks() -> usize {
    4
}

impl Default for DealflowConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            fmp_subdir: default_fmp_subdir(),
            poll_interval_seconds: default_poll_interval(),
            watcher_debounce_ms: default_debounce_ms(),
            retry_budget: default_retry_budget(),
            stage_timeout_seconds: default_stage_timeout(),
            total_tasks: default_total_tasks(),
        }
    }
}

impl DealflowConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output root directory.
    #[must_use]
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Sets the reconciler poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, seconds: f64) -> Self {
        self.poll_interval_seconds = seconds;
        self
    }

    /// Sets the elicitation retry budget.
    #[must_use]
    pub fn with_retry_budget(mut self, attempts: u32) -> Self {
        self.retry_budget = attempts;
        self
    }

    /// Sets the per-stage timeout.
    #[must_use]
    pub fn with_stage_timeout(mut self, seconds: f64) -> Self {
        self.stage_timeout_seconds = seconds;
        self
    }

    /// Gets the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_seconds)
    }

    /// Gets the watcher debounce window as a Duration.
    #[must_use]
    pub fn watcher_debounce(&self) -> Duration {
        Duration::from_millis(self.watcher_debounce_ms)
    }

    /// Gets the per-stage timeout as a Duration.
    #[must_use]
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.stage_timeout_seconds)
    }
}
