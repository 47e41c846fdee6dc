//! Per-company financial analysis within the analyst stage.
//!
//! The analyst iterates a batch of company symbols and writes one metrics
//! and one valuation artifact per symbol. A failure for one company must
//! never abort the batch: the failed item gets an inline error marker in its
//! artifact and the loop continues with the rest.

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::artifacts::ArtifactLayout;
use crate::progress::ProgressTracker;

/// A failure analyzing one company.
#[derive(Debug, Clone, Error)]
#[error("analysis failed for {symbol}: {message}")]
pub struct AnalysisError {
    /// The company symbol that failed.
    pub symbol: String,
    /// The failure message.
    pub message: String,
}

impl AnalysisError {
    /// Creates a new per-company analysis error.
    #[must_use]
    pub fn new(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            message: message.into(),
        }
    }
}

/// Computes per-company report bodies. External collaborator: the actual
/// metric and valuation math lives behind this trait.
#[async_trait]
pub trait CompanyAnalyzer: Send + Sync {
    /// Renders the metrics report body for one symbol.
    async fn metrics_report(&self, symbol: &str) -> Result<String, AnalysisError>;

    /// Renders the valuation report body for one symbol.
    async fn valuation_report(&self, symbol: &str) -> Result<String, AnalysisError>;
}

/// The result of analyzing one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyOutcome {
    /// The company symbol.
    pub symbol: String,
    /// Whether the metrics artifact carries real content (not a marker).
    pub metrics_ok: bool,
    /// Whether the valuation artifact carries real content (not a marker).
    pub valuation_ok: bool,
    /// The first error encountered for this symbol, if any.
    pub error: Option<String>,
}

/// Analyzes a batch of symbols, writing artifacts for each.
///
/// Each symbol gets `<SYMBOL>_metrics.md` and `<SYMBOL>_valuation.md` under
/// the layout's fmp directory. On a per-company failure the artifact is
/// still written, carrying an inline error marker, and the batch continues
/// with the remaining symbols.
pub async fn analyze_companies(
    analyzer: &dyn CompanyAnalyzer,
    symbols: &[String],
    layout: &ArtifactLayout,
    tracker: &ProgressTracker,
) -> Vec<CompanyOutcome> {
    if let Err(error) = layout.ensure_dirs() {
        warn!(%error, "could not create analysis output directory");
    }

    let mut outcomes = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        tracker.note_activity(&format!("Processing financial data for {symbol}"));

        let (metrics_ok, metrics_err) = write_report(
            &layout.metrics_path(symbol),
            analyzer.metrics_report(symbol).await,
            symbol,
            "metrics",
        );
        let (valuation_ok, valuation_err) = write_report(
            &layout.valuation_path(symbol),
            analyzer.valuation_report(symbol).await,
            symbol,
            "valuation",
        );

        outcomes.push(CompanyOutcome {
            symbol: symbol.clone(),
            metrics_ok,
            valuation_ok,
            error: metrics_err.or(valuation_err),
        });
    }

    outcomes
}

/// Writes one report artifact, downgrading a failed body to an inline error
/// marker so the artifact still exists and identifies the failure.
fn write_report(
    path: &Path,
    body: Result<String, AnalysisError>,
    symbol: &str,
    kind: &str,
) -> (bool, Option<String>) {
    match body {
        Ok(text) => match fs::write(path, text) {
            Ok(()) => (true, None),
            Err(error) => {
                warn!(symbol, kind, %error, "could not write analysis artifact");
                (false, Some(error.to_string()))
            }
        },
        Err(err) => {
            warn!(symbol, kind, error = %err, "per-company analysis failed");
            let marker = format!("# {symbol} {kind}\n\nError: {err}\n");
            if let Err(error) = fs::write(path, marker) {
                warn!(symbol, kind, %error, "could not write error marker");
            }
            (false, Some(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAnalyzer;
    use pretty_assertions::assert_eq;

    fn fixture() -> (tempfile::TempDir, ArtifactLayout, ProgressTracker) {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path(), "fmp_data");
        layout.ensure_dirs().unwrap();
        (dir, layout, ProgressTracker::new())
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_analyze_writes_both_artifacts_per_symbol() {
        let (_dir, layout, tracker) = fixture();
        let analyzer = ScriptedAnalyzer::new();

        let outcomes =
            analyze_companies(&analyzer, &symbols(&["AAPL", "MSFT"]), &layout, &tracker).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.metrics_ok && o.valuation_ok));
        assert!(layout.metrics_path("AAPL").exists());
        assert!(layout.valuation_path("AAPL").exists());
        assert!(layout.metrics_path("MSFT").exists());
        assert!(layout.valuation_path("MSFT").exists());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_the_batch() {
        let (_dir, layout, tracker) = fixture();
        let analyzer = ScriptedAnalyzer::new();
        analyzer.fail_symbol("MSFT", "no financial data");

        let outcomes = analyze_companies(
            &analyzer,
            &symbols(&["AAPL", "MSFT", "GOOG"]),
            &layout,
            &tracker,
        )
        .await;

        assert_eq!(outcomes.len(), 3);

        // The failed symbol is marked, with its artifacts carrying the error.
        let failed = &outcomes[1];
        assert_eq!(failed.symbol, "MSFT");
        assert!(!failed.metrics_ok);
        assert!(failed.error.as_deref().unwrap().contains("no financial data"));
        let marker = std::fs::read_to_string(layout.metrics_path("MSFT")).unwrap();
        assert!(marker.contains("Error:"));

        // The other symbols' artifacts are produced normally.
        for symbol in ["AAPL", "GOOG"] {
            let body = std::fs::read_to_string(layout.metrics_path(symbol)).unwrap();
            assert!(!body.contains("Error:"));
            assert!(layout.valuation_path(symbol).exists());
        }
    }

    #[tokio::test]
    async fn test_activity_message_tracks_current_symbol() {
        let (_dir, layout, tracker) = fixture();
        let analyzer = ScriptedAnalyzer::new();

        analyze_companies(&analyzer, &symbols(&["NVDA"]), &layout, &tracker).await;

        assert_eq!(
            tracker.snapshot().message,
            "Processing financial data for NVDA"
        );
        // Progress is driven by milestones, not the per-company loop.
        assert_eq!(tracker.snapshot().progress, 0.0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_noop() {
        let (_dir, layout, tracker) = fixture();
        let analyzer = ScriptedAnalyzer::new();

        let outcomes = analyze_companies(&analyzer, &[], &layout, &tracker).await;
        assert!(outcomes.is_empty());
    }
}
