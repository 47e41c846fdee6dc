//! First-observation signals for artifacts.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Records the first observation of a non-empty artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSignal {
    /// The stable key derived from the artifact's path suffix.
    pub artifact_key: String,
    /// When the artifact was first observed non-empty.
    pub detected_at: DateTime<Utc>,
}

/// Insert-or-ignore registry of observed artifacts.
///
/// Keyed by path suffix rather than full path, so the watcher and the poller
/// write to the same slot no matter which of them saw the artifact first.
/// Duplicate observations are dropped; the first detection time wins.
#[derive(Debug, Default)]
pub struct SignalLedger {
    inner: RwLock<BTreeMap<String, ArtifactSignal>>,
}

impl SignalLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observation. Returns true if the key was new.
    pub fn observe(&self, artifact_key: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.contains_key(artifact_key) {
            return false;
        }
        inner.insert(
            artifact_key.to_string(),
            ArtifactSignal {
                artifact_key: artifact_key.to_string(),
                detected_at: Utc::now(),
            },
        );
        true
    }

    /// Returns the signal for a key, if observed.
    #[must_use]
    pub fn get(&self, artifact_key: &str) -> Option<ArtifactSignal> {
        self.inner.read().get(artifact_key).cloned()
    }

    /// Returns true if the key has been observed.
    #[must_use]
    pub fn contains(&self, artifact_key: &str) -> bool {
        self.inner.read().contains_key(artifact_key)
    }

    /// Returns all observed keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    /// Number of observed artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if nothing has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Clears all observations.
    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_insert_or_ignore() {
        let ledger = SignalLedger::new();

        assert!(ledger.observe("output.md"));
        let first = ledger.get("output.md").unwrap();

        // A duplicate observation neither replaces nor restamps.
        assert!(!ledger.observe("output.md"));
        assert_eq!(ledger.get("output.md").unwrap(), first);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_keys_sorted() {
        let ledger = SignalLedger::new();
        ledger.observe("valuation.md");
        ledger.observe("companies.json");
        ledger.observe("AAPL_metrics.md");

        assert_eq!(
            ledger.keys(),
            vec!["AAPL_metrics.md", "companies.json", "valuation.md"]
        );
    }

    #[test]
    fn test_clear() {
        let ledger = SignalLedger::new();
        ledger.observe("output.md");
        assert!(!ledger.is_empty());

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(!ledger.contains("output.md"));
    }
}
