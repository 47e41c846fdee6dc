//! # Dealflow
//!
//! The coordination layer for a multi-stage M&A advisory workflow.
//!
//! Dealflow chains independent long-running advisory tasks and reflects
//! their progress to a polling consumer:
//!
//! - **Elicitation dialogue**: a staged conversation that collects strategy
//!   information from a model with an unreliable structured-output contract
//! - **Background pipeline**: strategist, researcher, analyst and valuator
//!   stages executed strictly in sequence on a background task
//! - **Progress tracking**: a single serialized status cell written by the
//!   runner, a filesystem watcher and a polling reconciler
//! - **Artifact signals**: output files as externally observable completion
//!   milestones, reconciled independently of watcher notifications
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dealflow::prelude::*;
//!
//! let session = SessionContext::new(DealflowConfig::default());
//! let mut dialogue = ElicitationMachine::new(client);
//!
//! let opening = dialogue.advance(None).await;
//! // ... drive the conversation until `outcome.complete` ...
//! dialogue.save_record(session.layout())?;
//!
//! session.start_pipeline(stages);
//! let status = session.status(); // poll at a bounded interval
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod artifacts;
pub mod cancellation;
pub mod config;
pub mod contract;
pub mod elicitation;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod progress;
pub mod reconcile;
pub mod session;
pub mod testing;
pub mod watch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::artifacts::{
        ArtifactLayout, ArtifactSignal, Milestone, SignalLedger,
    };
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::DealflowConfig;
    pub use crate::contract::{parse_reply, CollectedInfo, ElicitationReply, ParseOutcome};
    pub use crate::elicitation::{
        ConversationTurn, DialogueStage, ElicitationMachine, ModelClient,
        ModelError, StrategyRecord, TurnOutcome, TurnRole,
    };
    pub use crate::errors::{DealflowError, StageExecutionError};
    pub use crate::pipeline::{
        AdvisoryStage, AgentRole, CompanyAnalyzer, PipelineRunner, StageContext,
        COMPLETION_SENTINEL,
    };
    pub use crate::progress::{ProcessingStatus, ProgressTracker};
    pub use crate::reconcile::Reconciler;
    pub use crate::session::SessionContext;
    pub use crate::watch::ArtifactWatcher;
}
