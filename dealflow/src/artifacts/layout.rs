//! Artifact paths and the milestone table.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::DealflowConfig;

/// A pipeline milestone, identified by its artifact's path suffix.
///
/// This is the single static suffix table shared by the watcher and the
/// reconciler: suffix, progress fraction, completion message, follow-up task
/// and task id all live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// The elicitation snapshot was persisted.
    StrategyInfo,
    /// The strategy report was generated.
    StrategyReport,
    /// Target companies were identified.
    Companies,
    /// The valuation report was generated.
    ValuationReport,
}

impl Milestone {
    /// All milestones, in pipeline order.
    pub const ALL: [Self; 4] = [
        Self::StrategyInfo,
        Self::StrategyReport,
        Self::Companies,
        Self::ValuationReport,
    ];

    /// The artifact file name this milestone is keyed on.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::StrategyInfo => "strategy_info.json",
            Self::StrategyReport => "output.md",
            Self::Companies => "companies.json",
            Self::ValuationReport => "valuation.md",
        }
    }

    /// The progress fraction reached when this milestone is satisfied.
    #[must_use]
    pub fn fraction(self) -> f64 {
        match self {
            Self::StrategyInfo => 0.25,
            Self::StrategyReport => 0.5,
            Self::Companies => 0.75,
            Self::ValuationReport => 1.0,
        }
    }

    /// The status message announcing this milestone.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::StrategyInfo => "Strategy information collected",
            Self::StrategyReport => "Strategy report generated",
            Self::Companies => "Companies identified",
            Self::ValuationReport => "Valuation complete",
        }
    }

    /// The task that follows this milestone.
    #[must_use]
    pub fn next_task(self) -> &'static str {
        match self {
            Self::StrategyInfo => "Researching companies",
            Self::StrategyReport => "Analyzing financials",
            Self::Companies => "Performing valuation",
            Self::ValuationReport => "Analysis complete",
        }
    }

    /// The stable task identifier inserted into the completed set.
    #[must_use]
    pub fn task_id(self) -> &'static str {
        match self {
            Self::StrategyInfo => "strategy",
            Self::StrategyReport => "report",
            Self::Companies => "companies",
            Self::ValuationReport => "valuation",
        }
    }

    /// Classifies a changed path by its file name.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL.into_iter().find(|m| m.suffix() == name)
    }
}

/// Fixed locations of all pipeline output artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
    fmp_data: PathBuf,
}

impl ArtifactLayout {
    /// Creates a layout rooted at `root` with the given per-company subdir.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, fmp_subdir: &str) -> Self {
        let root = root.into();
        let fmp_data = root.join(fmp_subdir);
        Self { root, fmp_data }
    }

    /// Creates the layout described by a configuration.
    #[must_use]
    pub fn from_config(config: &DealflowConfig) -> Self {
        Self::new(&config.output_root, &config.fmp_subdir)
    }

    /// The output root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The per-company financial data directory.
    #[must_use]
    pub fn fmp_data_dir(&self) -> &Path {
        &self.fmp_data
    }

    /// The path of a milestone artifact.
    #[must_use]
    pub fn milestone_path(&self, milestone: Milestone) -> PathBuf {
        self.root.join(milestone.suffix())
    }

    /// The metrics artifact for one company symbol.
    #[must_use]
    pub fn metrics_path(&self, symbol: &str) -> PathBuf {
        self.fmp_data.join(format!("{symbol}_metrics.md"))
    }

    /// The valuation artifact for one company symbol.
    #[must_use]
    pub fn valuation_path(&self, symbol: &str) -> PathBuf {
        self.fmp_data.join(format!("{symbol}_valuation.md"))
    }

    /// Returns the signal key for a per-company artifact, if the path is one.
    ///
    /// Keys are file names (stable across moves of the root), matching
    /// `<SYMBOL>_metrics.md` or `<SYMBOL>_valuation.md` under the fmp
    /// directory.
    #[must_use]
    pub fn company_artifact_key(&self, path: &Path) -> Option<String> {
        if !path.starts_with(&self.fmp_data) {
            return None;
        }
        let name = path.file_name()?.to_str()?;
        if name.ends_with("_metrics.md") || name.ends_with("_valuation.md") {
            Some(name.to_string())
        } else {
            None
        }
    }

    /// Extracts the company symbol from a per-company artifact key.
    #[must_use]
    pub fn symbol_of(key: &str) -> &str {
        key.split('_').next().unwrap_or(key)
    }

    /// Creates the output directories if missing.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(&self.fmp_data)
    }

    /// Deletes everything under the root and recreates the empty tree.
    ///
    /// Used by the consumer's reset command before a fresh run.
    pub fn reset(&self) -> io::Result<()> {
        if self.root.exists() {
            for entry in fs::read_dir(&self.root)? {
                let path = entry?.path();
                if path.is_dir() {
                    fs::remove_dir_all(&path)?;
                } else {
                    fs::remove_file(&path)?;
                }
            }
        }
        self.ensure_dirs()
    }
}

/// The shared artifact predicate: the file exists and is non-empty.
#[must_use]
pub fn is_satisfied(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}
