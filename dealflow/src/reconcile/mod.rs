//! Poll-based reconciliation of artifact state.
//!
//! The reconciler is the authoritative source of truth for pipeline
//! progress: on every tick it inspects artifact existence and size directly,
//! independent of watcher notifications, and performs the same idempotent
//! `raise_progress` calls. Missed or duplicated watcher events therefore
//! never stall or corrupt the status - the next tick converges it.

use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::artifacts::{is_satisfied, ArtifactLayout, Milestone, SignalLedger};
use crate::cancellation::CancellationToken;
use crate::progress::ProgressTracker;

/// Periodically derives authoritative status from artifact state.
pub struct Reconciler {
    layout: ArtifactLayout,
    tracker: Arc<ProgressTracker>,
    ledger: Arc<SignalLedger>,
}

impl Reconciler {
    /// Creates a reconciler over the given layout and shared state.
    #[must_use]
    pub fn new(
        layout: ArtifactLayout,
        tracker: Arc<ProgressTracker>,
        ledger: Arc<SignalLedger>,
    ) -> Self {
        Self {
            layout,
            tracker,
            ledger,
        }
    }

    /// One idempotent reconciliation pass. Returns the number of satisfied
    /// milestone artifacts.
    ///
    /// Every satisfied milestone is raised through the same call the watcher
    /// uses; when all milestones are satisfied while the pipeline is still
    /// marked running, the run is forced to completion. Artifacts may appear
    /// in any order - the max-merge and the task-id set are both
    /// order-independent.
    pub fn tick(&self) -> usize {
        let mut satisfied = 0;

        for milestone in Milestone::ALL {
            let path = self.layout.milestone_path(milestone);
            if is_satisfied(&path) {
                satisfied += 1;
                self.ledger.observe(milestone.suffix());
                self.tracker.raise_progress(
                    milestone.fraction(),
                    milestone.message(),
                    milestone.next_task(),
                    milestone.task_id(),
                );
            }
        }

        self.scan_company_artifacts();

        if satisfied == Milestone::ALL.len() && self.tracker.snapshot().is_running {
            info!("all milestone artifacts present; forcing completion");
            self.tracker.complete();
        }

        satisfied
    }

    /// Registers per-company artifacts that appeared since the last pass.
    fn scan_company_artifacts(&self) {
        let Ok(entries) = fs::read_dir(self.layout.fmp_data_dir()) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(key) = self.layout.company_artifact_key(&path) {
                if is_satisfied(&path) && self.ledger.observe(&key) {
                    debug!(artifact = %key, "company artifact observed by poll");
                }
            }
        }
    }

    /// Runs the reconciliation loop at a bounded interval.
    ///
    /// Exits when the token is cancelled, or once a run it has watched go
    /// live is no longer running (completion and failure both end the loop).
    pub async fn run(self, interval: Duration, cancel: CancellationToken) {
        let mut saw_running = false;
        loop {
            tokio::time::sleep(interval).await;
            if cancel.is_cancelled() {
                debug!("reconciler stopping: cancelled");
                return;
            }

            saw_running |= self.tracker.snapshot().is_running;
            self.tick();

            let status = self.tracker.snapshot();
            if !status.is_running && (saw_running || status.error.is_some()) {
                debug!("reconciler stopping: run finished");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::write_milestone_artifacts;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn fixture() -> (
        tempfile::TempDir,
        Reconciler,
        Arc<ProgressTracker>,
        Arc<SignalLedger>,
        ArtifactLayout,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path(), "fmp_data");
        layout.ensure_dirs().unwrap();
        let tracker = Arc::new(ProgressTracker::new());
        let ledger = Arc::new(SignalLedger::new());
        let reconciler = Reconciler::new(layout.clone(), tracker.clone(), ledger.clone());
        (dir, reconciler, tracker, ledger, layout)
    }

    #[test]
    fn test_tick_on_empty_tree() {
        let (_dir, reconciler, tracker, _ledger, _layout) = fixture();
        assert_eq!(reconciler.tick(), 0);
        assert_eq!(tracker.snapshot().progress, 0.0);
    }

    #[test]
    fn test_tick_raises_satisfied_milestones() {
        let (_dir, reconciler, tracker, ledger, layout) = fixture();
        fs::write(layout.milestone_path(Milestone::StrategyInfo), "{}").unwrap();
        fs::write(layout.milestone_path(Milestone::StrategyReport), "# r").unwrap();

        assert_eq!(reconciler.tick(), 2);

        let status = tracker.snapshot();
        assert_eq!(status.progress, 0.5);
        assert!(status.completed_tasks.contains("strategy"));
        assert!(status.completed_tasks.contains("report"));
        assert!(ledger.contains("strategy_info.json"));
    }

    #[test]
    fn test_tick_ignores_empty_files() {
        let (_dir, reconciler, tracker, _ledger, layout) = fixture();
        fs::write(layout.milestone_path(Milestone::Companies), "").unwrap();

        assert_eq!(reconciler.tick(), 0);
        assert_eq!(tracker.snapshot().progress, 0.0);
    }

    #[test]
    fn test_tick_forces_completion_when_running() {
        let (_dir, reconciler, tracker, _ledger, layout) = fixture();
        write_milestone_artifacts(&layout).unwrap();
        assert!(tracker.try_begin_run());

        reconciler.tick();

        let status = tracker.snapshot();
        assert!(!status.is_running);
        assert_eq!(status.progress, 1.0);
        assert_eq!(status.message, "Analysis complete");
        assert_eq!(status.completed_count(), 4);
    }

    #[test]
    fn test_tick_does_not_force_completion_when_idle() {
        let (_dir, reconciler, tracker, _ledger, layout) = fixture();
        write_milestone_artifacts(&layout).unwrap();

        reconciler.tick();

        // Progress converges but a run that never started is not "completed".
        let status = tracker.snapshot();
        assert!(!status.is_running);
        assert_eq!(status.progress, 1.0);
        assert_eq!(status.message, "Valuation complete");
    }

    #[test]
    fn test_tick_is_idempotent() {
        let (_dir, reconciler, tracker, _ledger, layout) = fixture();
        write_milestone_artifacts(&layout).unwrap();
        assert!(tracker.try_begin_run());

        reconciler.tick();
        let first = tracker.snapshot();
        reconciler.tick();
        let second = tracker.snapshot();

        assert_eq!(first.progress, second.progress);
        assert_eq!(first.completed_tasks, second.completed_tasks);
        assert_eq!(first.is_running, second.is_running);
    }

    #[test]
    fn test_out_of_order_artifacts_tolerated() {
        let (_dir, reconciler, tracker, _ledger, layout) = fixture();
        // The valuation artifact lands before any earlier milestone.
        fs::write(layout.milestone_path(Milestone::ValuationReport), "# v").unwrap();
        reconciler.tick();
        assert_eq!(tracker.snapshot().progress, 1.0);

        // Earlier artifacts arriving later never lower progress.
        fs::write(layout.milestone_path(Milestone::StrategyInfo), "{}").unwrap();
        reconciler.tick();

        let status = tracker.snapshot();
        assert_eq!(status.progress, 1.0);
        assert!(status.completed_tasks.contains("strategy"));
        assert!(status.completed_tasks.contains("valuation"));
    }

    #[test]
    fn test_scan_registers_company_artifacts() {
        let (_dir, reconciler, _tracker, ledger, layout) = fixture();
        fs::write(layout.metrics_path("AAPL"), "# metrics").unwrap();
        fs::write(layout.valuation_path("AAPL"), "# valuation").unwrap();
        fs::write(layout.metrics_path("MSFT"), "# metrics").unwrap();

        reconciler.tick();

        assert!(ledger.contains("AAPL_metrics.md"));
        assert!(ledger.contains("AAPL_valuation.md"));
        assert!(ledger.contains("MSFT_metrics.md"));
    }

    #[tokio::test]
    async fn test_run_loop_converges_without_watcher() {
        let (_dir, reconciler, tracker, _ledger, layout) = fixture();
        assert!(tracker.try_begin_run());
        write_milestone_artifacts(&layout).unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(reconciler.run(Duration::from_millis(10), cancel));

        handle.await.unwrap();

        let status = tracker.snapshot();
        assert!(!status.is_running);
        assert_eq!(status.progress, 1.0);
    }

    #[tokio::test]
    async fn test_run_loop_honors_cancellation() {
        let (_dir, reconciler, _tracker, _ledger, _layout) = fixture();
        let cancel = CancellationToken::new();
        cancel.cancel("test shutdown");

        // Returns promptly despite no artifacts ever appearing.
        tokio::time::timeout(
            Duration::from_secs(1),
            reconciler.run(Duration::from_millis(10), cancel),
        )
        .await
        .unwrap();
    }
}
