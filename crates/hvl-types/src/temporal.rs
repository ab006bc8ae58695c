use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp of a custody event, kept as the RFC 3339 text found on disk.
///
/// Like [`ContentHash`](crate::ContentHash), the raw string is what loads:
/// a hand-edited or foreign-format value must not make the whole ledger
/// unreadable. It is parsed only when ordering is checked, and a value that
/// does not parse is reported against its own record.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTime(String);

impl EventTime {
    /// RFC 3339 in UTC with a `Z` suffix; sub-second digits only when present.
    pub fn from_instant(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    /// The instant this timestamp names, or `None` if it is not RFC 3339.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.0)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_instant(at)
    }
}

impl fmt::Debug for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventTime({})", self.0)
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Timestamp for the next custody event in a history.
///
/// Returns `now` unless the previous event carries a later instant (wall
/// clock stepped backwards), in which case the previous instant is reused so
/// the history never goes back in time. A previous timestamp that does not
/// parse is ignored. Ordering is best-effort: it is not cryptographically
/// enforced.
pub fn next_event_time(previous: Option<&EventTime>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous.and_then(EventTime::instant) {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}
