//! Mock collaborators for testing.

use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::PathBuf;

use crate::elicitation::{ModelClient, ModelError};
use crate::errors::StageExecutionError;
use crate::pipeline::{
    AdvisoryStage, AgentRole, AnalysisError, CompanyAnalyzer, OutputStream, StageContext,
};

/// A model client that replays a scripted sequence of replies.
#[derive(Debug, Default)]
pub struct ScriptedModelClient {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    call_count: Mutex<usize>,
}

impl ScriptedModelClient {
    /// Creates a client with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful reply.
    pub fn push_text(&self, text: impl Into<String>) {
        self.script.lock().push_back(Ok(text.into()));
    }

    /// Queues a transport failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .push_back(Err(ModelError(message.into())));
    }

    /// Returns the number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        *self.call_count.lock() += 1;
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError("script exhausted".to_string())))
    }
}

/// A stage that writes configured artifacts and streams configured chunks.
pub struct StubStage {
    role: AgentRole,
    artifacts: Vec<(PathBuf, String)>,
    chunks: Vec<Result<String, StageExecutionError>>,
}

impl StubStage {
    /// Creates a stub for the given role with no artifacts or output.
    #[must_use]
    pub fn new(role: AgentRole) -> Self {
        Self {
            role,
            artifacts: Vec::new(),
            chunks: Vec::new(),
        }
    }

    /// Adds an artifact to write when the stage runs. Paths are relative to
    /// the layout root.
    #[must_use]
    pub fn with_artifact(mut self, relative_path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        self.artifacts.push((relative_path.into(), body.into()));
        self
    }

    /// Adds an output chunk to stream.
    #[must_use]
    pub fn with_chunk(mut self, chunk: impl Into<String>) -> Self {
        self.chunks.push(Ok(chunk.into()));
        self
    }

    /// Adds a mid-stream failure after any earlier chunks.
    #[must_use]
    pub fn with_chunk_error(mut self, message: impl Into<String>) -> Self {
        let role = self.role;
        self.chunks
            .push(Err(StageExecutionError::new(role.name(), message)));
        self
    }
}

#[async_trait]
impl AdvisoryStage for StubStage {
    fn role(&self) -> AgentRole {
        self.role
    }

    async fn run(&self, ctx: &StageContext) -> Result<OutputStream, StageExecutionError> {
        for (relative, body) in &self.artifacts {
            let path = ctx.layout.root().join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| StageExecutionError::new(self.role.name(), e.to_string()))?;
            }
            fs::write(&path, body)
                .map_err(|e| StageExecutionError::new(self.role.name(), e.to_string()))?;
        }

        Ok(stream::iter(self.chunks.clone()).boxed())
    }
}

/// A stage that fails before producing any output.
pub struct FailingStage {
    role: AgentRole,
    message: String,
}

impl FailingStage {
    /// Creates a failing stage.
    #[must_use]
    pub fn new(role: AgentRole, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
        }
    }
}

#[async_trait]
impl AdvisoryStage for FailingStage {
    fn role(&self) -> AgentRole {
        self.role
    }

    async fn run(&self, _ctx: &StageContext) -> Result<OutputStream, StageExecutionError> {
        Err(StageExecutionError::new(self.role.name(), self.message.clone()))
    }
}

/// An analyzer that returns canned bodies, failing configured symbols.
#[derive(Debug, Default)]
pub struct ScriptedAnalyzer {
    failures: Mutex<HashMap<String, String>>,
}

impl ScriptedAnalyzer {
    /// Creates an analyzer that succeeds for every symbol.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes both reports fail for the given symbol.
    pub fn fail_symbol(&self, symbol: impl Into<String>, message: impl Into<String>) {
        self.failures.lock().insert(symbol.into(), message.into());
    }

    fn check(&self, symbol: &str) -> Result<(), AnalysisError> {
        if let Some(message) = self.failures.lock().get(symbol) {
            return Err(AnalysisError::new(symbol, message.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl CompanyAnalyzer for ScriptedAnalyzer {
    async fn metrics_report(&self, symbol: &str) -> Result<String, AnalysisError> {
        self.check(symbol)?;
        Ok(format!("# {symbol} Financial Metrics\n\n| metric | value |\n"))
    }

    async fn valuation_report(&self, symbol: &str) -> Result<String, AnalysisError> {
        self.check(symbol)?;
        Ok(format!("# {symbol} Valuation\n\nEnterprise value summary.\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactLayout;
    use crate::cancellation::CancellationToken;

    #[tokio::test]
    async fn test_scripted_client_replays_in_order() {
        let client = ScriptedModelClient::new();
        client.push_text("first");
        client.push_error("down");

        assert_eq!(client.complete("p").await.unwrap(), "first");
        assert!(client.complete("p").await.is_err());
        // Exhausted scripts look like transport failures.
        assert!(client.complete("p").await.is_err());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_stub_stage_writes_artifacts_and_streams() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path(), "fmp_data");
        layout.ensure_dirs().unwrap();

        let stage = StubStage::new(AgentRole::Strategist)
            .with_artifact("output.md", "# Strategy")
            .with_chunk("thinking...")
            .with_chunk("done");

        let ctx = StageContext {
            layout: layout.clone(),
            cancel: CancellationToken::new(),
        };

        let mut output = stage.run(&ctx).await.unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = output.next().await {
            chunks.push(chunk.unwrap());
        }

        assert_eq!(chunks, vec!["thinking...", "done"]);
        assert!(layout.root().join("output.md").exists());
    }

    #[tokio::test]
    async fn test_failing_stage_errors() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ArtifactLayout::new(dir.path(), "fmp_data");
        let stage = FailingStage::new(AgentRole::Researcher, "search backend offline");

        let ctx = StageContext {
            layout,
            cancel: CancellationToken::new(),
        };

        let err = stage.run(&ctx).await.err().unwrap();
        assert_eq!(err.stage, "researcher");
    }

    #[tokio::test]
    async fn test_scripted_analyzer_failures() {
        let analyzer = ScriptedAnalyzer::new();
        analyzer.fail_symbol("MSFT", "missing data");

        assert!(analyzer.metrics_report("AAPL").await.is_ok());
        assert!(analyzer.metrics_report("MSFT").await.is_err());
        assert!(analyzer.valuation_report("MSFT").await.is_err());
    }
}
