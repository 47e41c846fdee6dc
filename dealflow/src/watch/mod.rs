//! Filesystem notifications for artifact signals.
//!
//! Watches the output root with a debounced `notify` watcher and maps each
//! created or modified artifact to the same `raise_progress` call the
//! reconciler performs. Notification delivery is not guaranteed - events can
//! be coalesced or lost across restarts - so the watcher is an accelerant,
//! not the source of truth: the system stays correct with it disabled
//! entirely (see [`crate::reconcile`]).

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::artifacts::{is_satisfied, ArtifactLayout, Milestone, SignalLedger};
use crate::errors::DealflowError;
use crate::progress::ProgressTracker;

/// Default debounce window for rapid artifact writes.
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Debounced watcher over the artifact output root.
///
/// Dropping the watcher stops it.
pub struct ArtifactWatcher {
    // Held for its Drop side effect; the notification thread dies with it.
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ArtifactWatcher {
    /// Starts watching the layout's root with the default debounce window.
    pub fn start(
        layout: ArtifactLayout,
        tracker: Arc<ProgressTracker>,
        ledger: Arc<SignalLedger>,
    ) -> Result<Self, DealflowError> {
        Self::start_with_debounce(layout, tracker, ledger, DEFAULT_DEBOUNCE)
    }

    /// Starts watching with an explicit debounce window.
    pub fn start_with_debounce(
        layout: ArtifactLayout,
        tracker: Arc<ProgressTracker>,
        ledger: Arc<SignalLedger>,
        debounce: Duration,
    ) -> Result<Self, DealflowError> {
        layout.ensure_dirs()?;
        let root = layout.root().to_path_buf();

        let mut debouncer = new_debouncer(
            debounce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| match result {
                Ok(events) => {
                    for event in events {
                        handle_change(&layout, &tracker, &ledger, &event.path);
                    }
                }
                Err(error) => {
                    warn!(%error, "artifact watch error");
                }
            },
        )
        .map_err(|e| DealflowError::Watch(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| DealflowError::Watch(e.to_string()))?;

        debug!(root = %root.display(), "artifact watcher started");

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Maps one changed path to its progress signal.
///
/// Runs on the watcher's notification thread; every mutation goes through
/// the tracker's serialized API, and duplicate events for the same artifact
/// are harmless because the raise is idempotent.
fn handle_change(
    layout: &ArtifactLayout,
    tracker: &ProgressTracker,
    ledger: &SignalLedger,
    path: &Path,
) {
    if path.is_dir() {
        return;
    }

    if let Some(milestone) = Milestone::from_path(path) {
        if is_satisfied(path) {
            ledger.observe(milestone.suffix());
            tracker.raise_progress(
                milestone.fraction(),
                milestone.message(),
                milestone.next_task(),
                milestone.task_id(),
            );
            debug!(artifact = milestone.suffix(), "milestone artifact observed");
        }
    } else if let Some(key) = layout.company_artifact_key(path) {
        if is_satisfied(path) {
            ledger.observe(&key);
            let symbol = ArtifactLayout::symbol_of(&key);
            tracker.note_activity(&format!("Processing financial data for {symbol}"));
        }
    }
}
