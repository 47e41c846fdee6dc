//! The structured-output contract expected from model replies.
//!
//! The elicitation model is asked to answer with a fixed JSON object, but the
//! contract is not guaranteed to be honored every turn: replies arrive as
//! free-form text that may wrap, truncate or mangle the object. This module
//! extracts and decodes what it can and reports the rest as
//! [`ParseOutcome::Malformed`] for the state machine to recover from.

mod parser;
mod reply;

pub use parser::{parse_reply, ParseOutcome};
pub use reply::{CollectedInfo, ElicitationReply};
