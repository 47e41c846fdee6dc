//! Wire types for the elicitation reply contract.

use serde::{Deserialize, Deserializer, Serialize};

/// A structured reply from the elicitation model.
///
/// Every field is defaulted so a reply that omits keys still decodes;
/// field-level validation is best-effort coercion only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElicitationReply {
    /// Whether the model considers the current stage answered.
    #[serde(deserialize_with = "coerce_bool")]
    pub answer_complete: bool,
    /// The stage name the model believes it is in.
    #[serde(deserialize_with = "coerce_string")]
    pub current_stage: String,
    /// Whether all necessary strategy information has been collected.
    #[serde(deserialize_with = "coerce_bool")]
    pub is_strategy_complete: bool,
    /// Field values extracted from the conversation so far.
    pub collected_info: CollectedInfo,
    /// The model's next message to the user.
    #[serde(deserialize_with = "coerce_string")]
    pub next_message: String,
}

/// The field mapping carried inside a reply.
///
/// Null stays null; set values overwrite on merge (last-non-null-wins is
/// applied by [`crate::elicitation::StrategyRecord::merge`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectedInfo {
    /// Target industry or sector.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub industry: Option<String>,
    /// A specific acquisition target, if one was named.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub specific_company: Option<String>,
    /// Goals for the acquisition.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub goals: Option<String>,
    /// Budget information.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub budget: Option<String>,
    /// Timeline information.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub timeline: Option<String>,
    /// Financial-health notes on the target.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub financial_health: Option<String>,
    /// Market-position notes on the target.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub market_position: Option<String>,
    /// Whether risks are a concern.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub risks_concern: Option<String>,
    /// Details on the risks raised.
    #[serde(deserialize_with = "coerce_opt_string")]
    pub risks_details: Option<String>,
    /// Completion flag echoed by the model.
    #[serde(deserialize_with = "coerce_bool")]
    pub is_complete: bool,
}

fn coerce_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}

fn coerce_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

fn coerce_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    })
}

/// Scalars become strings; null, arrays and objects become `None`.
fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}
