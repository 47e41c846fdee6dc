//! Pipeline progress tracking.
//!
//! [`ProgressTracker`] is the single serialized mutation point shared by the
//! pipeline runner, the filesystem watcher's callback thread and the polling
//! reconciler. Readers poll [`ProgressTracker::snapshot`] and never mutate.

mod status;
mod tracker;

pub use status::ProcessingStatus;
pub use tracker::ProgressTracker;
