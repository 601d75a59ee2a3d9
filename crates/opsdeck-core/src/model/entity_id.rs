// ── Core identity types ──
//
// EntityId is the stable row identifier every engine component keys on:
// selection sets, store indexes, undo intents. The backend hands out
// numeric autoincrement ids; synthetic rows (audit lines without a
// database id) fall back to text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier for any panel entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(i64),
    Text(String),
}

impl EntityId {
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::EntityId;

    #[test]
    fn numeric_accessor() {
        assert_eq!(EntityId::from(42).as_numeric(), Some(42));
        assert_eq!(EntityId::from("evt:1").as_numeric(), None);
    }

    #[test]
    fn display_round_trip() {
        assert_eq!(EntityId::from(7).to_string(), "7");
        assert_eq!(EntityId::from("log:3").to_string(), "log:3");
    }
}
