//! The background advisory pipeline.
//!
//! Four agent stages executed strictly in sequence on a background task.
//! Stage bodies are external collaborators behind [`AdvisoryStage`]; this
//! module owns the ordering, the progress recording, the terminal sentinel
//! scan and the failure containment.

mod analysis;
mod runner;


pub use analysis::{analyze_companies, AnalysisError, CompanyAnalyzer, CompanyOutcome};
pub use runner::PipelineRunner;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::artifacts::ArtifactLayout;
use crate::cancellation::CancellationToken;
use crate::errors::StageExecutionError;

/// Fixed literal token signaling full pipeline completion.
///
/// Scanned in every unit of streamed output; authoritative independently of
/// artifact state and of which stage is currently active.
pub const COMPLETION_SENTINEL: &str = "MNA_PROCESS_COMPLETE";

/// The four advisory agents, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Drafts the acquisition strategy report.
    Strategist,
    /// Searches for candidate target companies.
    Researcher,
    /// Collects and analyzes per-company financials.
    Analyst,
    /// Produces the final valuation report.
    Valuator,
}

impl AgentRole {
    /// The fixed execution order of the pipeline.
    pub const SEQUENCE: [Self; 4] = [
        Self::Strategist,
        Self::Researcher,
        Self::Analyst,
        Self::Valuator,
    ];

    /// The agent's wire/display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Strategist => "strategist",
            Self::Researcher => "researcher",
            Self::Analyst => "analyst",
            Self::Valuator => "valuator",
        }
    }

    /// The progress floor reached once this agent starts.
    #[must_use]
    pub fn fraction(self) -> f64 {
        match self {
            Self::Strategist => 0.25,
            Self::Researcher => 0.5,
            Self::Analyst => 0.75,
            Self::Valuator => 1.0,
        }
    }

    /// The task label shown while this agent works.
    #[must_use]
    pub fn task(self) -> &'static str {
        match self {
            Self::Strategist => "Generating strategy report",
            Self::Researcher => "Researching companies",
            Self::Analyst => "Analyzing financials",
            Self::Valuator => "Generating valuation report",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What a stage gets to work with.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// Where the stage writes its artifacts.
    pub layout: ArtifactLayout,
    /// Cooperative cancellation, checked by long-running stage internals.
    pub cancel: CancellationToken,
}

/// Streamed output units from a running stage.
pub type OutputStream = BoxStream<'static, Result<String, StageExecutionError>>;

/// One unit of work in the advisory pipeline.
///
/// Implementations draft reports, run searches or compute metrics; the
/// runner only cares that they stream their output (so the sentinel can be
/// scanned) and report failure through the error type.
#[async_trait]
pub trait AdvisoryStage: Send + Sync {
    /// Which agent this stage embodies.
    fn role(&self) -> AgentRole;

    /// Starts the stage and returns its output stream.
    async fn run(&self, ctx: &StageContext) -> Result<OutputStream, StageExecutionError>;
}
