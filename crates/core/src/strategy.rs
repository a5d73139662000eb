//! The verification ladder.
//!
//! Strategies are ordered by cost. An escalation run only ever moves forward
//! through [`Strategy::next`]; `Manual` is terminal and is not a live check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// A single-URL verification strategy.
///
/// The serialized tags are the ones stored in the cache file's `hint` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Plain HEAD (then GET) request.
    #[serde(rename = "fetch-node")]
    PlainRequest,
    /// Same request, identifying as a desktop browser.
    #[serde(rename = "fetch-browser-agent")]
    BrowserAgent,
    /// Full headless-browser navigation.
    #[serde(rename = "playwright")]
    BrowserEngine,
    /// Operator-declared outcome read from the cache.
    #[serde(rename = "manual")]
    Manual,
}

impl Strategy {
    /// All strategies in ladder order.
    pub const LADDER: [Strategy; 4] =
        [Strategy::PlainRequest, Strategy::BrowserAgent, Strategy::BrowserEngine, Strategy::Manual];

    /// The strategy that follows this one, or `None` once the ladder is exhausted.
    pub const fn next(self) -> Option<Strategy> {
        match self {
            Strategy::PlainRequest => Some(Strategy::BrowserAgent),
            Strategy::BrowserAgent => Some(Strategy::BrowserEngine),
            Strategy::BrowserEngine => Some(Strategy::Manual),
            Strategy::Manual => None,
        }
    }

    /// Whether this strategy performs network activity.
    pub const fn is_live(self) -> bool {
        !matches!(self, Strategy::Manual)
    }

    /// Where to enter the ladder given a cached hint.
    ///
    /// A `Manual` hint cannot be resumed from, so it restarts at the cheapest rung.
    pub fn resume_from(hint: Option<Strategy>) -> Strategy {
        match hint {
            Some(strategy) if strategy.is_live() => strategy,
            _ => Strategy::PlainRequest,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::PlainRequest => "fetch-node",
            Strategy::BrowserAgent => "fetch-browser-agent",
            Strategy::BrowserEngine => "playwright",
            Strategy::Manual => "manual",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fetch-node" => Ok(Strategy::PlainRequest),
            "fetch-browser-agent" => Ok(Strategy::BrowserAgent),
            "playwright" => Ok(Strategy::BrowserEngine),
            "manual" => Ok(Strategy::Manual),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Lenient deserializer for an optional hint: unknown tags become `None`.
pub(crate) fn deserialize_hint<'de, D>(deserializer: D) -> Result<Option<Strategy>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_order_follows_next() {
        let mut walked = vec![Strategy::PlainRequest];
        let mut current = Strategy::PlainRequest;
        while let Some(next) = current.next() {
            walked.push(next);
            current = next;
        }
        assert_eq!(walked, Strategy::LADDER.to_vec());
    }

    #[test]
    fn test_next_is_strictly_increasing() {
        for strategy in Strategy::LADDER {
            if let Some(next) = strategy.next() {
                assert!(next > strategy);
            }
        }
    }

    #[test]
    fn test_resume_from_live_hint() {
        assert_eq!(Strategy::resume_from(Some(Strategy::BrowserEngine)), Strategy::BrowserEngine);
        assert_eq!(Strategy::resume_from(Some(Strategy::BrowserAgent)), Strategy::BrowserAgent);
    }

    #[test]
    fn test_resume_from_manual_or_missing_restarts() {
        assert_eq!(Strategy::resume_from(Some(Strategy::Manual)), Strategy::PlainRequest);
        assert_eq!(Strategy::resume_from(None), Strategy::PlainRequest);
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(serde_json::to_string(&Strategy::BrowserAgent).unwrap(), "\"fetch-browser-agent\"");
        let parsed: Strategy = serde_json::from_str("\"playwright\"").unwrap();
        assert_eq!(parsed, Strategy::BrowserEngine);
    }

    #[test]
    fn test_from_str_round_trips_display() {
        for strategy in Strategy::LADDER {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert!("curl".parse::<Strategy>().is_err());
    }
}
