//! Identifier newtypes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A user identifier, taken verbatim from the client's auth frame.
///
/// Clients may send the id as a JSON string or a number; both are normalized
/// to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalize the `user_id` field of an auth frame.
    ///
    /// Returns `None` for JSON null; numbers and other scalars become their
    /// textual form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self(s.clone())),
            other => Some(Self(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A match session identifier: `match_<initiator>_<partner>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub String);

impl MatchId {
    pub fn for_pair(initiator: &UserId, partner: &UserId) -> Self {
        Self(format!("match_{}_{}", initiator, partner))
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
