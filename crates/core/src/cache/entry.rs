//! Cache entries and the freshness rule.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::manual::{ManualState, deserialize_manual};
use crate::strategy::{Strategy, deserialize_hint};

/// Last-known verification outcome for one URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// HTTP status, absent if the URL never resolved to a numeric code.
    #[serde(default)]
    pub status: Option<u16>,

    /// Whether the URL was last judged reachable.
    pub ok: bool,

    /// When this entry was last written.
    #[serde(with = "timestamp")]
    pub last_checked: DateTime<Utc>,

    /// Last error message when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Strategy that produced the last result; escalation resumes here.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_hint")]
    pub hint: Option<Strategy>,

    /// Operator override.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_manual")]
    pub manual: Option<ManualState>,
}

impl CacheEntry {
    /// Whether this entry can be served without a live check.
    ///
    /// Fresh means: `ok`, status equal to `expected_status`, no `false`/`"auto"`
    /// manual override, and checked no longer than `max_age` before `now`
    /// (the boundary itself is fresh).
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration, expected_status: u16) -> bool {
        if !self.ok || self.status != Some(expected_status) {
            return false;
        }
        if matches!(self.manual, Some(ManualState::Fail) | Some(ManualState::Auto)) {
            return false;
        }
        now.signed_duration_since(self.last_checked) <= max_age
    }
}

/// ISO-8601 timestamps with millisecond precision.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}
