//! Output artifacts as completion signals.
//!
//! The pipeline communicates with the consumer through the filesystem: each
//! stage writes artifacts under a fixed output root, and each milestone
//! artifact doubles as an externally observable completion signal keyed by
//! its path suffix. Both the watcher and the reconciler classify paths
//! through the same static table so their writes land in the same slot.

mod layout;
mod signals;

pub use layout::{is_satisfied, ArtifactLayout, Milestone};
pub use signals::{ArtifactSignal, SignalLedger};
