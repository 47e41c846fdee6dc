//! Shared fixtures for workflow tests.

use anyhow::Result;
use std::fs;

use crate::artifacts::{ArtifactLayout, Milestone};

/// Writes all four milestone artifacts with plausible non-empty bodies.
pub fn write_milestone_artifacts(layout: &ArtifactLayout) -> Result<()> {
    layout.ensure_dirs()?;
    fs::write(
        layout.milestone_path(Milestone::StrategyInfo),
        r#"{"industry": "Technology", "is_complete": true}"#,
    )?;
    fs::write(
        layout.milestone_path(Milestone::StrategyReport),
        "# Acquisition Strategy\n",
    )?;
    fs::write(
        layout.milestone_path(Milestone::Companies),
        r#"[{"symbol": "AAPL"}]"#,
    )?;
    fs::write(
        layout.milestone_path(Milestone::ValuationReport),
        "# Valuation Report\n",
    )?;
    Ok(())
}

/// Writes metrics and valuation artifacts for each symbol.
pub fn write_company_artifacts(layout: &ArtifactLayout, symbols: &[&str]) -> Result<()> {
    layout.ensure_dirs()?;
    for symbol in symbols {
        fs::write(layout.metrics_path(symbol), format!("# {symbol} metrics\n"))?;
        fs::write(
            layout.valuation_path(symbol),
            format!("# {symbol} valuation\n"),
        )?;
    }
    Ok(())
}
