//! The accumulated strategy record and conversation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::CollectedInfo;

/// The strategy information accumulated across dialogue turns.
///
/// Every field is optional until the model sets it; once set it is retained
/// (last-non-null-wins across turns). Serialized once, at dialogue
/// completion, as the `strategy_info.json` artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyRecord {
    /// Target industry or sector.
    pub industry: Option<String>,
    /// A specific acquisition target, if one was named.
    pub specific_company: Option<String>,
    /// Goals for the acquisition.
    pub goals: Option<String>,
    /// Budget information.
    pub budget: Option<String>,
    /// Timeline information.
    pub timeline: Option<String>,
    /// Financial-health notes on the target.
    pub financial_health: Option<String>,
    /// Market-position notes on the target.
    pub market_position: Option<String>,
    /// Whether risks are a concern.
    pub risks_concern: Option<String>,
    /// Details on the risks raised.
    pub risks_details: Option<String>,
    /// True once the dialogue has collected everything it needs.
    pub is_complete: bool,
}

impl StrategyRecord {
    /// Merges every non-null field from a reply into this record.
    ///
    /// Null fields leave existing values untouched. The completion flag is
    /// owned by the state machine and deliberately not merged here.
    pub fn merge(&mut self, info: &CollectedInfo) {
        merge_field(&mut self.industry, &info.industry);
        merge_field(&mut self.specific_company, &info.specific_company);
        merge_field(&mut self.goals, &info.goals);
        merge_field(&mut self.budget, &info.budget);
        merge_field(&mut self.timeline, &info.timeline);
        merge_field(&mut self.financial_health, &info.financial_health);
        merge_field(&mut self.market_position, &info.market_position);
        merge_field(&mut self.risks_concern, &info.risks_concern);
        merge_field(&mut self.risks_details, &info.risks_details);
    }
}

fn merge_field(target: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        *target = Some(value.clone());
    }
}

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// The human user.
    User,
    /// The advisory assistant.
    Assistant,
}

/// One turn of the elicitation conversation.
///
/// Turns are append-only and immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who produced the turn.
    pub role: TurnRole,
    /// The turn text.
    pub text: String,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Creates a user turn stamped now.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an assistant turn stamped now.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
