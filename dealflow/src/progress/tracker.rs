//! The serialized progress-mutation point.

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use super::status::ProcessingStatus;

/// Process-wide progress state with a single serialized mutation point.
///
/// Three producers write through this type - the background runner, the
/// watcher's notification thread and the polling reconciler - and none may
/// assume it is the sole writer. All mutators take the write lock for their
/// whole read-modify-write, so progress can only move forward:
///
/// - `progress` merges by `max` and is never decreased once raised
/// - `completed_tasks` is insert-only
/// - duplicate raises for the same milestone are no-ops
pub struct ProgressTracker {
    inner: RwLock<ProcessingStatus>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Creates a tracker in the ready state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ProcessingStatus::default()),
        }
    }

    /// Creates a tracker with an explicit milestone count.
    #[must_use]
    pub fn with_total_tasks(total_tasks: usize) -> Self {
        Self {
            inner: RwLock::new(ProcessingStatus::with_total_tasks(total_tasks)),
        }
    }

    /// Returns a read-only copy of the current status.
    #[must_use]
    pub fn snapshot(&self) -> ProcessingStatus {
        self.inner.read().clone()
    }

    /// Raises progress to at least `fraction` and records a completed task.
    ///
    /// The message and current task are overwritten only when the fraction
    /// actually increased; the task id insertion is idempotent either way.
    /// Safe to call from any producer, any number of times, in any order.
    pub fn raise_progress(&self, fraction: f64, message: &str, task: &str, task_id: &str) {
        let mut status = self.inner.write();
        if fraction > status.progress {
            status.progress = fraction.min(1.0);
            status.message = message.to_string();
            status.current_task = Some(task.to_string());
            debug!(fraction, task_id, "progress raised");
        }
        status.completed_tasks.insert(task_id.to_string());
    }

    /// Atomically claims the run: returns false if one is already running.
    ///
    /// On success the start time is stamped, the error cleared and
    /// `is_running` set.
    pub fn try_begin_run(&self) -> bool {
        let mut status = self.inner.write();
        if status.is_running {
            return false;
        }
        status.is_running = true;
        status.start_time = Some(Utc::now());
        status.error = None;
        status.message = "Starting analysis...".to_string();
        true
    }

    /// Records a stage transition: agent, task and the stage's floor fraction.
    pub fn stage_started(&self, agent: &str, fraction: f64, task: &str) {
        let mut status = self.inner.write();
        status.current_agent = Some(agent.to_string());
        status.current_task = Some(task.to_string());
        if fraction > status.progress {
            status.progress = fraction.min(1.0);
        }
        status.message = format!("Working on {}", task.to_lowercase());
    }

    /// Updates the status message without touching progress.
    ///
    /// Used for per-company activity notes during a stage's internal loop.
    pub fn note_activity(&self, message: &str) {
        self.inner.write().message = message.to_string();
    }

    /// Records an unrecoverable failure.
    pub fn set_error(&self, error: &str) {
        let mut status = self.inner.write();
        status.error = Some(error.to_string());
        status.message = "Error during analysis".to_string();
    }

    /// Sets the running flag.
    pub fn mark_running(&self, running: bool) {
        self.inner.write().is_running = running;
    }

    /// Records a cancelled run and flushes the terminal snapshot state.
    pub fn mark_cancelled(&self, reason: &str) {
        let mut status = self.inner.write();
        status.error = Some("cancelled".to_string());
        status.message = format!("Analysis cancelled: {reason}");
        status.is_running = false;
    }

    /// Forces terminal completion: full progress, not running.
    pub fn complete(&self) {
        let mut status = self.inner.write();
        status.progress = 1.0;
        status.is_running = false;
        status.message = "Analysis complete".to_string();
        status.current_task = Some("Complete".to_string());
    }

    /// Resets to the ready state, keeping the configured task count.
    pub fn reset(&self) {
        let mut status = self.inner.write();
        *status = ProcessingStatus::with_total_tasks(status.total_tasks);
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.snapshot();
        f.debug_struct("ProgressTracker")
            .field("progress", &status.progress)
            .field("is_running", &status.is_running)
            .field("completed", &status.completed_count())
            .finish()
    }
}
