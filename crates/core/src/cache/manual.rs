//! Operator override state stored in the cache's `manual` field.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state manual override.
///
/// Serialized as `true`, `false` or `"auto"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManualState {
    /// Operator asserts the URL is reachable.
    Pass,
    /// Operator asserts the URL is unreachable or blocked.
    Fail,
    /// Operator acknowledged automatic-pending status: soft pass, keep re-checking.
    Auto,
}

impl ManualState {
    pub fn as_json(self) -> serde_json::Value {
        match self {
            ManualState::Pass => serde_json::Value::Bool(true),
            ManualState::Fail => serde_json::Value::Bool(false),
            ManualState::Auto => serde_json::Value::String("auto".into()),
        }
    }
}

/// Parse a hand-edited manual value.
///
/// Accepts booleans and the strings `"true"`, `"false"`, `"auto"` (case and
/// whitespace tolerant). Anything else yields `None`.
pub fn normalize_manual_state(raw: &serde_json::Value) -> Option<ManualState> {
    match raw {
        serde_json::Value::Bool(true) => Some(ManualState::Pass),
        serde_json::Value::Bool(false) => Some(ManualState::Fail),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(ManualState::Pass),
            "false" => Some(ManualState::Fail),
            "auto" => Some(ManualState::Auto),
            _ => None,
        },
        _ => None,
    }
}

impl Serialize for ManualState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ManualState::Pass => serializer.serialize_bool(true),
            ManualState::Fail => serializer.serialize_bool(false),
            ManualState::Auto => serializer.serialize_str("auto"),
        }
    }
}

/// Lenient deserializer for the optional `manual` field.
pub(crate) fn deserialize_manual<'de, D>(deserializer: D) -> Result<Option<ManualState>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(normalize_manual_state))
}
