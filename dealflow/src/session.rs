//! The process-owned session context.
//!
//! One explicit object owns all shared workflow state - configuration,
//! artifact layout, progress tracker, signal ledger and cancellation token -
//! and is handed to each component at construction. There is no ambient or
//! static state anywhere in the crate.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::artifacts::{ArtifactLayout, SignalLedger};
use crate::cancellation::CancellationToken;
use crate::config::DealflowConfig;
use crate::errors::DealflowError;
use crate::pipeline::{AdvisoryStage, PipelineRunner};
use crate::progress::{ProcessingStatus, ProgressTracker};
use crate::reconcile::Reconciler;
use crate::watch::ArtifactWatcher;

/// Shared state for one advisory session.
///
/// The consumer-facing surface: poll [`SessionContext::status`] at a bounded
/// interval, start the pipeline once the elicitation record is saved, and
/// reset everything before a fresh run.
pub struct SessionContext {
    config: DealflowConfig,
    layout: ArtifactLayout,
    tracker: Arc<ProgressTracker>,
    ledger: Arc<SignalLedger>,
    cancel: CancellationToken,
    run_id: Uuid,
}

impl SessionContext {
    /// Creates a session from a configuration.
    #[must_use]
    pub fn new(config: DealflowConfig) -> Self {
        let layout = ArtifactLayout::from_config(&config);
        let tracker = Arc::new(ProgressTracker::with_total_tasks(config.total_tasks));
        Self {
            config,
            layout,
            tracker,
            ledger: Arc::new(SignalLedger::new()),
            cancel: CancellationToken::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &DealflowConfig {
        &self.config
    }

    /// The artifact layout for this session.
    #[must_use]
    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// The shared progress tracker.
    #[must_use]
    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        &self.tracker
    }

    /// The shared signal ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<SignalLedger> {
        &self.ledger
    }

    /// The session's cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The unique id of this session.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns a read-only snapshot of pipeline progress.
    #[must_use]
    pub fn status(&self) -> ProcessingStatus {
        self.tracker.snapshot()
    }

    /// Starts the artifact watcher for this session's output root.
    ///
    /// Optional: the reconciler alone keeps status correct; the watcher only
    /// tightens latency. The returned handle stops watching when dropped.
    pub fn start_watcher(&self) -> Result<ArtifactWatcher, DealflowError> {
        ArtifactWatcher::start_with_debounce(
            self.layout.clone(),
            self.tracker.clone(),
            self.ledger.clone(),
            self.config.watcher_debounce(),
        )
    }

    /// Starts the background pipeline over the given stages.
    ///
    /// Idempotent: if a run is already in flight nothing is spawned and
    /// false is returned. Otherwise the runner and the polling reconciler
    /// are both spawned onto the current tokio runtime.
    pub fn start_pipeline(&self, stages: Vec<Arc<dyn AdvisoryStage>>) -> Result<bool, DealflowError> {
        if self.tracker.snapshot().is_running {
            return Ok(false);
        }

        self.layout.ensure_dirs()?;
        info!(run_id = %self.run_id, stages = stages.len(), "starting advisory pipeline");

        let runner = PipelineRunner::new(
            stages,
            self.tracker.clone(),
            self.layout.clone(),
            self.cancel.clone(),
            self.config.stage_timeout(),
        );
        tokio::spawn(runner.run());

        let reconciler = Reconciler::new(
            self.layout.clone(),
            self.tracker.clone(),
            self.ledger.clone(),
        );
        tokio::spawn(reconciler.run(self.config.poll_interval(), self.cancel.clone()));

        Ok(true)
    }

    /// Requests cancellation of the running pipeline.
    ///
    /// Honored at the next stage boundary; the final snapshot is flushed
    /// with `is_running = false` and `error = "cancelled"`.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.cancel.cancel(reason);
    }

    /// Clears all artifacts and resets status and signals for a fresh run.
    pub fn reset(&self) -> Result<(), DealflowError> {
        self.layout.reset()?;
        self.tracker.reset();
        self.ledger.clear();
        info!(run_id = %self.run_id, "session reset");
        Ok(())
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("run_id", &self.run_id)
            .field("output_root", &self.layout.root())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Milestone;
    use crate::pipeline::AgentRole;
    use crate::testing::StubStage;
    use std::time::Duration;

    fn test_session(dir: &tempfile::TempDir) -> SessionContext {
        let config = DealflowConfig::new()
            .with_output_root(dir.path())
            .with_poll_interval(0.05)
            .with_stage_timeout(5.0);
        SessionContext::new(config)
    }

    #[test]
    fn test_initial_status_is_ready() {
        let dir = tempfile::tempdir().unwrap();
        let session = test_session(&dir);

        let status = session.status();
        assert!(!status.is_running);
        assert_eq!(status.progress, 0.0);
        assert_eq!(status.message, "Ready to start analysis");
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let session = test_session(&dir);
        session.layout().ensure_dirs().unwrap();

        std::fs::write(
            session.layout().milestone_path(Milestone::StrategyInfo),
            "{}",
        )
        .unwrap();
        session.tracker().raise_progress(0.25, "m", "t", "strategy");
        session.ledger().observe("strategy_info.json");

        session.reset().unwrap();

        assert_eq!(session.status().progress, 0.0);
        assert!(session.ledger().is_empty());
        assert!(!session
            .layout()
            .milestone_path(Milestone::StrategyInfo)
            .exists());
    }

    #[tokio::test]
    async fn test_start_pipeline_runs_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let session = test_session(&dir);

        let stages: Vec<Arc<dyn AdvisoryStage>> = vec![
            Arc::new(StubStage::new(AgentRole::Strategist).with_artifact("strategy_info.json", "{}")
                .with_artifact("output.md", "# Strategy")),
            Arc::new(StubStage::new(AgentRole::Researcher).with_artifact("companies.json", "[]")),
            Arc::new(StubStage::new(AgentRole::Analyst)),
            Arc::new(StubStage::new(AgentRole::Valuator).with_artifact("valuation.md", "# Valuation")),
        ];

        assert!(session.start_pipeline(stages).unwrap());

        for _ in 0..100 {
            let status = session.status();
            if !status.is_running && status.progress >= 1.0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let status = session.status();
        assert!(!status.is_running);
        assert_eq!(status.progress, 1.0);
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn test_start_pipeline_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let session = test_session(&dir);

        // Claim the run slot as a running pipeline would.
        assert!(session.tracker().try_begin_run());

        let stages: Vec<Arc<dyn AdvisoryStage>> =
            vec![Arc::new(StubStage::new(AgentRole::Strategist))];
        assert!(!session.start_pipeline(stages).unwrap());
    }
}
