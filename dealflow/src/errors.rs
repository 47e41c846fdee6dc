//! Error types for the dealflow coordination layer.
//!
//! Contract-parse failures are deliberately absent from this taxonomy: a
//! malformed model reply is recovered inside the elicitation machine (see
//! [`crate::contract::ParseOutcome`]) and never crosses a component boundary
//! as an error.

use thiserror::Error;

/// The main error type for dealflow operations.
#[derive(Debug, Error)]
pub enum DealflowError {
    /// A pipeline stage failed during execution.
    #[error("{0}")]
    StageExecution(#[from] StageExecutionError),

    /// The pipeline was cancelled.
    #[error("Pipeline cancelled: {0}")]
    Cancelled(String),

    /// The filesystem watcher could not be started or fed.
    #[error("Watcher error: {0}")]
    Watch(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when a pipeline stage fails.
///
/// Recorded into `ProcessingStatus.error` by the runner; never allowed to
/// propagate past it.
#[derive(Debug, Clone, Error)]
#[error("Stage '{stage}' failed: {message}")]
pub struct StageExecutionError {
    /// The stage that failed.
    pub stage: String,
    /// The failure message.
    pub message: String,
}

impl StageExecutionError {
    /// Creates a new stage execution error.
    #[must_use]
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
