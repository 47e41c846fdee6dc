//! Dialogue stage enum and transition table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete step in the elicitation dialogue.
///
/// The order is total and progression is strictly forward, one step at a
/// time; `Complete` is absorbing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueStage {
    /// Target industry or sector.
    Industry,
    /// Goals for the acquisition.
    Goals,
    /// Budget range.
    Budget,
    /// Expected timeline.
    Timeline,
    /// Financial health of the target.
    FinancialHealth,
    /// Market position of the target.
    MarketPosition,
    /// Risk concerns.
    Risks,
    /// All information collected; dialogue wrapping up.
    Completion,
    /// Terminal state.
    Complete,
}

impl Default for DialogueStage {
    fn default() -> Self {
        Self::Industry
    }
}

impl fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Industry => "INDUSTRY",
            Self::Goals => "GOALS",
            Self::Budget => "BUDGET",
            Self::Timeline => "TIMELINE",
            Self::FinancialHealth => "FINANCIAL_HEALTH",
            Self::MarketPosition => "MARKET_POSITION",
            Self::Risks => "RISKS",
            Self::Completion => "COMPLETION",
            Self::Complete => "COMPLETE",
        };
        write!(f, "{name}")
    }
}

impl DialogueStage {
    /// Returns the next stage in the progression.
    ///
    /// Every stage maps to exactly one successor; `Complete` maps to itself.
    #[must_use]
    pub fn successor(self) -> Self {
        match self {
            Self::Industry => Self::Goals,
            Self::Goals => Self::Budget,
            Self::Budget => Self::Timeline,
            Self::Timeline => Self::FinancialHealth,
            Self::FinancialHealth => Self::MarketPosition,
            Self::MarketPosition => Self::Risks,
            Self::Risks => Self::Completion,
            Self::Completion | Self::Complete => Self::Complete,
        }
    }

    /// Returns true once the dialogue has collected everything it needs.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completion | Self::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_chain_is_total() {
        let mut stage = DialogueStage::Industry;
        let mut visited = vec![stage];
        for _ in 0..10 {
            stage = stage.successor();
            visited.push(stage);
        }
        assert_eq!(visited[7], DialogueStage::Completion);
        assert_eq!(visited[8], DialogueStage::Complete);
        // Complete is absorbing.
        assert_eq!(visited[9], DialogueStage::Complete);
        assert_eq!(visited[10], DialogueStage::Complete);
    }

    #[test]
    fn test_successor_is_strictly_forward() {
        let mut stage = DialogueStage::Industry;
        loop {
            let next = stage.successor();
            assert!(next >= stage);
            if next == stage {
                break;
            }
            stage = next;
        }
        assert_eq!(stage, DialogueStage::Complete);
    }

    #[test]
    fn test_stage_display_matches_wire_names() {
        assert_eq!(DialogueStage::Industry.to_string(), "INDUSTRY");
        assert_eq!(DialogueStage::FinancialHealth.to_string(), "FINANCIAL_HEALTH");
        assert_eq!(DialogueStage::Completion.to_string(), "COMPLETION");
    }

    #[test]
    fn test_stage_serialize() {
        let json = serde_json::to_string(&DialogueStage::MarketPosition).unwrap();
        assert_eq!(json, r#""MARKET_POSITION""#);

        let stage: DialogueStage = serde_json::from_str(r#""RISKS""#).unwrap();
        assert_eq!(stage, DialogueStage::Risks);
    }

    #[test]
    fn test_terminal_stages() {
        assert!(DialogueStage::Completion.is_terminal());
        assert!(DialogueStage::Complete.is_terminal());
        assert!(!DialogueStage::Risks.is_terminal());
    }
}
