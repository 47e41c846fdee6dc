//! The elicitation state machine.

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::record::{ConversationTurn, StrategyRecord};
use super::stage::DialogueStage;
use crate::artifacts::{ArtifactLayout, Milestone};
use crate::contract::{parse_reply, ElicitationReply, ParseOutcome};
use crate::errors::DealflowError;

/// The fixed opening prompt for the first turn.
pub const WELCOME_MESSAGE: &str = "Welcome! To begin our M&A strategy discussion, \
    do you have a specific company in mind for acquisition, or are you targeting \
    a particular market or sector?";

/// The generic clarification prompt returned when recovery is impossible.
pub const CLARIFICATION_MESSAGE: &str = "I'm having trouble processing that. \
    Could you please provide key information clearly? For example, what industry \
    are you targeting and what are your main goals?";

/// The fixed vocabulary the keyword fallback may match against.
///
/// This is the entire rule table: the fallback never fabricates a field from
/// anything outside it.
pub const INDUSTRY_KEYWORDS: &[&str] = &[
    "technology",
    "healthcare",
    "finance",
    "education",
    "retail",
    "manufacturing",
];

/// Error from the opaque model collaborator.
///
/// Treated identically to a malformed reply for retry purposes.
#[derive(Debug, Clone, Error)]
#[error("model call failed: {0}")]
pub struct ModelError(pub String);

/// An opaque generative-model client: prompt in, free-form text out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends a prompt and returns the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// The result of one dialogue turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The message to show the user next.
    pub reply: String,
    /// True once all strategy information has been collected.
    pub complete: bool,
}

/// Drives the staged elicitation dialogue against an unreliable contract.
///
/// The machine always makes forward progress: a reply that honors the
/// contract advances normally, and a reply that does not is retried and then
/// recovered through a narrow keyword fallback so the dialogue never stalls.
pub struct ElicitationMachine {
    client: Arc<dyn ModelClient>,
    stage: DialogueStage,
    record: StrategyRecord,
    history: Vec<ConversationTurn>,
    retry_budget: u32,
}

impl ElicitationMachine {
    /// Creates a new machine at the first stage with the default retry budget.
    #[must_use]
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self::with_retry_budget(client, 3)
    }

    /// Creates a new machine with an explicit retry budget.
    #[must_use]
    pub fn with_retry_budget(client: Arc<dyn ModelClient>, retry_budget: u32) -> Self {
        Self {
            client,
            stage: DialogueStage::Industry,
            record: StrategyRecord::default(),
            history: Vec::new(),
            retry_budget: retry_budget.max(1),
        }
    }

    /// Returns the current dialogue stage.
    #[must_use]
    pub fn stage(&self) -> DialogueStage {
        self.stage
    }

    /// Returns the accumulated strategy record.
    #[must_use]
    pub fn record(&self) -> &StrategyRecord {
        &self.record
    }

    /// Returns the conversation history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Returns true once the dialogue has collected everything it needs.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.record.is_complete || self.stage.is_terminal()
    }

    /// Advances the dialogue by one turn.
    ///
    /// With no user message (the first call) this returns the fixed welcome
    /// prompt. Otherwise the user message is sent to the model along with the
    /// current stage and record; the reply is parsed against the contract,
    /// retried on failure up to the budget, and finally recovered through the
    /// keyword fallback. This method never fails outward - transport errors
    /// and malformed replies both resolve to a usable prompt.
    pub async fn advance(&mut self, user_message: Option<&str>) -> TurnOutcome {
        let Some(user_message) = user_message else {
            self.history.push(ConversationTurn::assistant(WELCOME_MESSAGE));
            return TurnOutcome {
                reply: WELCOME_MESSAGE.to_string(),
                complete: false,
            };
        };

        self.history.push(ConversationTurn::user(user_message));
        let prompt = self.build_prompt(user_message);

        for attempt in 1..=self.retry_budget {
            match self.client.complete(&prompt).await {
                Ok(text) => match parse_reply(&text) {
                    ParseOutcome::Parsed(reply) => {
                        let outcome = self.apply_reply(&reply);
                        self.history.push(ConversationTurn::assistant(&outcome.reply));
                        return outcome;
                    }
                    ParseOutcome::Malformed(_) => {
                        warn!(attempt, stage = %self.stage, "reply did not honor the output contract");
                    }
                },
                Err(error) => {
                    warn!(attempt, stage = %self.stage, %error, "model call failed");
                }
            }
        }

        let outcome = self.fallback(user_message);
        self.history.push(ConversationTurn::assistant(&outcome.reply));
        outcome
    }

    /// Writes the terminal record snapshot into the output layout.
    pub fn save_record(&self, layout: &ArtifactLayout) -> Result<PathBuf, DealflowError> {
        layout.ensure_dirs()?;
        let path = layout.milestone_path(Milestone::StrategyInfo);
        let body = serde_json::to_string_pretty(&self.record)?;
        fs::write(&path, body)?;
        info!(path = %path.display(), "strategy record saved");
        Ok(path)
    }

    fn build_prompt(&self, user_message: &str) -> String {
        let state = serde_json::to_string_pretty(&self.record).unwrap_or_default();
        format!(
            "Current stage: {stage}\n\
             Current state: {state}\n\
             User message: {user_message}\n\n\
             Remember to respond only with a JSON object in the specified format, \
             including the is_strategy_complete flag.\n\
             If you have trouble parsing the user's message, try to extract relevant \
             information anyway and request clarification in your next_message.\n",
            stage = self.stage,
        )
    }

    fn apply_reply(&mut self, reply: &ElicitationReply) -> TurnOutcome {
        self.record.merge(&reply.collected_info);
        self.record.is_complete = reply.is_strategy_complete;

        if reply.is_strategy_complete {
            // Walk forward to COMPLETION: the record is complete exactly when
            // the stage is terminal, wherever the dialogue currently stands.
            while self.stage < DialogueStage::Completion {
                self.stage = self.stage.successor();
            }
        } else if reply.answer_complete {
            self.stage = self.stage.successor();
        }

        debug!(stage = %self.stage, complete = reply.is_strategy_complete, "turn applied");

        let reply_text = if reply.next_message.is_empty() {
            "Could you provide more details?".to_string()
        } else {
            reply.next_message.clone()
        };

        TurnOutcome {
            reply: reply_text,
            complete: reply.is_strategy_complete,
        }
    }

    /// Deterministic recovery after the retry budget is exhausted.
    ///
    /// Only the industry stage may recover a field, and only from the fixed
    /// keyword vocabulary; every other case leaves stage and record untouched.
    fn fallback(&mut self, user_message: &str) -> TurnOutcome {
        if self.stage == DialogueStage::Industry && self.record.industry.is_none() {
            let lowered = user_message.to_lowercase();
            for keyword in INDUSTRY_KEYWORDS {
                if lowered.contains(keyword) {
                    self.record.industry = Some(capitalize(keyword));
                    self.stage = self.stage.successor();
                    info!(industry = keyword, "industry recovered via keyword fallback");
                    return TurnOutcome {
                        reply: format!(
                            "I understand you're interested in the {keyword} sector. \
                             What are your primary goals for this M&A strategy?"
                        ),
                        complete: false,
                    };
                }
            }
        }

        TurnOutcome {
            reply: CLARIFICATION_MESSAGE.to_string(),
            complete: false,
        }
    }
}

impl std::fmt::Debug for ElicitationMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElicitationMachine")
            .field("stage", &self.stage)
            .field("turns", &self.history.len())
            .field("retry_budget", &self.retry_budget)
            .finish()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
