//! Test doubles and fixtures for the workflow's external collaborators.

mod fixtures;
mod mocks;

pub use fixtures::{write_company_artifacts, write_milestone_artifacts};
pub use mocks::{FailingStage, ScriptedAnalyzer, ScriptedModelClient, StubStage};
