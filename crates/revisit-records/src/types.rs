use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::schedule;

/// Opaque identifier for a stored record.
///
/// Employee stores hand out sequence numbers; question stores use the
/// backend's native UUIDs. Both round-trip through their string form, so
/// path parameters and JSON bodies carry either kind without the service
/// caring which one it holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Counter-issued id, serialised as a JSON number.
    Seq(u64),
    /// Store-generated id, serialised as a hyphenated string.
    Uuid(Uuid),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Seq(n) => write!(f, "{n}"),
            RecordId::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl std::str::FromStr for RecordId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.parse::<u64>() {
            return Ok(RecordId::Seq(n));
        }
        Uuid::parse_str(s)
            .map(RecordId::Uuid)
            .map_err(|_| ValidationError::MalformedId(s.to_string()))
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Seq(n)
    }
}

impl From<Uuid> for RecordId {
    fn from(u: Uuid) -> Self {
        RecordId::Uuid(u)
    }
}

/// Predicate applied by `Repository::list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    /// Every live record.
    All,
    /// Records whose next revision date is at or before the instant.
    DueBy(DateTime<Utc>),
}

impl ListFilter {
    /// Whether a record with the given due date passes this filter.
    ///
    /// Records without a due date are never due.
    pub fn admits(&self, due_at: Option<DateTime<Utc>>) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::DueBy(cutoff) => due_at.is_some_and(|due| schedule::is_due(due, *cutoff)),
        }
    }
}
