//! Sequential execution of the advisory pipeline.

use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::{AdvisoryStage, StageContext, COMPLETION_SENTINEL};
use crate::artifacts::{is_satisfied, ArtifactLayout, Milestone};
use crate::cancellation::CancellationToken;
use crate::errors::StageExecutionError;
use crate::progress::ProgressTracker;

/// How a drained stage ended.
enum StageEnd {
    /// The stream finished normally.
    Finished,
    /// The terminal sentinel appeared in a streamed chunk.
    SentinelSeen,
}

/// Executes the ordered stage sequence on a background execution context.
///
/// One stage at a time, in order; progress is recorded into the shared
/// tracker at each stage transition. A stage failure or timeout is caught,
/// recorded and halts the pipeline without crashing anything - the consumer
/// keeps polling a valid snapshot either way.
pub struct PipelineRunner {
    stages: Vec<Arc<dyn AdvisoryStage>>,
    tracker: Arc<ProgressTracker>,
    layout: ArtifactLayout,
    cancel: CancellationToken,
    stage_timeout: Duration,
}

impl PipelineRunner {
    /// Creates a runner over the given stages.
    #[must_use]
    pub fn new(
        stages: Vec<Arc<dyn AdvisoryStage>>,
        tracker: Arc<ProgressTracker>,
        layout: ArtifactLayout,
        cancel: CancellationToken,
        stage_timeout: Duration,
    ) -> Self {
        Self {
            stages,
            tracker,
            layout,
            cancel,
            stage_timeout,
        }
    }

    /// Runs the pipeline to completion, failure or cancellation.
    ///
    /// Idempotent at the entry: if a run is already in flight this is a
    /// no-op. Never panics and never returns an error - every outcome is
    /// reflected in the tracker for the polling consumer.
    pub async fn run(self) {
        if !self.tracker.try_begin_run() {
            warn!("pipeline already running; start ignored");
            return;
        }

        for stage in &self.stages {
            if self.cancel.is_cancelled() {
                let reason = self.cancel.reason().unwrap_or_else(|| "cancelled".to_string());
                info!(%reason, "pipeline cancelled at stage boundary");
                self.tracker.mark_cancelled(&reason);
                return;
            }

            let role = stage.role();
            info!(agent = role.name(), "starting pipeline stage");
            self.tracker.stage_started(role.name(), role.fraction(), role.task());

            let ctx = StageContext {
                layout: self.layout.clone(),
                cancel: self.cancel.clone(),
            };

            match tokio::time::timeout(self.stage_timeout, self.drain(stage.as_ref(), &ctx)).await {
                Ok(Ok(StageEnd::SentinelSeen)) => {
                    info!(agent = role.name(), "completion sentinel detected");
                    self.tracker.complete();
                    return;
                }
                Ok(Ok(StageEnd::Finished)) => {}
                Ok(Err(err)) => {
                    error!(agent = role.name(), error = %err, "pipeline stage failed");
                    self.tracker.set_error(&format!("Analysis error: {err}"));
                    self.tracker.mark_running(false);
                    return;
                }
                Err(_) => {
                    let err = StageExecutionError::new(
                        role.name(),
                        format!("timed out after {:?}", self.stage_timeout),
                    );
                    error!(agent = role.name(), error = %err, "pipeline stage timed out");
                    self.tracker.set_error(&format!("Analysis error: {err}"));
                    self.tracker.mark_running(false);
                    return;
                }
            }
        }

        self.finish();
    }

    /// Drains one stage's output stream, scanning each unit for the sentinel.
    async fn drain(
        &self,
        stage: &dyn AdvisoryStage,
        ctx: &StageContext,
    ) -> Result<StageEnd, StageExecutionError> {
        let mut output = stage.run(ctx).await?;

        while let Some(chunk) = output.next().await {
            let chunk = chunk?;
            if chunk.contains(COMPLETION_SENTINEL) {
                return Ok(StageEnd::SentinelSeen);
            }
        }

        Ok(StageEnd::Finished)
    }

    /// Terminal bookkeeping when every stage ran without a sentinel.
    ///
    /// If all milestone artifacts landed the run is complete; otherwise the
    /// running flag is dropped so the consumer is not left spinning, and the
    /// reconciler keeps converging whatever did land.
    fn finish(&self) {
        let all_present = Milestone::ALL
            .iter()
            .all(|m| is_satisfied(&self.layout.milestone_path(*m)));

        if all_present {
            self.tracker.complete();
        } else {
            warn!("pipeline finished without all milestone artifacts");
            self.tracker.mark_running(false);
        }
    }
}

impl std::fmt::Debug for PipelineRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
            .field("stages", &self.stages.len())
            .field("stage_timeout", &self.stage_timeout)
            .finish()
    }
}
