//! The consumer-facing status record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A point-in-time view of pipeline progress.
///
/// Snapshots are cloned out of the tracker whole, so a reader may observe a
/// slightly stale state but never a torn one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStatus {
    /// The agent currently executing, if any.
    pub current_agent: Option<String>,
    /// The task currently in flight, if any.
    pub current_task: Option<String>,
    /// When the pipeline run started.
    pub start_time: Option<DateTime<Utc>>,
    /// Overall progress in `[0, 1]`; monotonically non-decreasing.
    pub progress: f64,
    /// Human-readable status message.
    pub message: String,
    /// The recorded failure, if the pipeline halted on an error.
    pub error: Option<String>,
    /// Identifiers of completed milestone tasks; insert-only.
    pub completed_tasks: BTreeSet<String>,
    /// The fixed number of milestone tasks in a run.
    pub total_tasks: usize,
    /// Whether the background pipeline is currently running.
    pub is_running: bool,
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self {
            current_agent: None,
            current_task: None,
            start_time: None,
            progress: 0.0,
            message: "Ready to start analysis".to_string(),
            error: None,
            completed_tasks: BTreeSet::new(),
            total_tasks: 4,
            is_running: false,
        }
    }
}

impl ProcessingStatus {
    /// Creates a fresh status with the given task count.
    #[must_use]
    pub fn with_total_tasks(total_tasks: usize) -> Self {
        Self {
            total_tasks,
            ..Self::default()
        }
    }

    /// Number of milestone tasks completed so far.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_tasks.len()
    }

    /// Returns true once every milestone task has completed.
    #[must_use]
    pub fn all_tasks_complete(&self) -> bool {
        self.completed_tasks.len() >= self.total_tasks
    }
}
