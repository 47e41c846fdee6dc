//! The staged elicitation dialogue.
//!
//! A linear conversation that collects acquisition-strategy information one
//! stage at a time. The machine owns the dialogue stage, the accumulated
//! record and the conversation history; the model is an opaque collaborator
//! whose structured-output contract may not be honored on any given turn.

mod machine;
mod record;
mod stage;

pub use machine::{
    ElicitationMachine, ModelClient, ModelError, TurnOutcome, CLARIFICATION_MESSAGE,
    INDUSTRY_KEYWORDS, WELCOME_MESSAGE,
};
pub use record::{ConversationTurn, StrategyRecord, TurnRole};
pub use stage::DialogueStage;
