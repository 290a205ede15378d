//! Transition logging.
//!
//! Every machine keeps an ordered log of the transitions it has taken,
//! recorded as immutable values. The log exists for observability of a
//! running topology; it is not a persistence mechanism.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single transition a machine has taken.
///
/// Records carry the display names of the states involved, not their
/// identities; they are diagnostic values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the state the machine left.
    pub from: String,
    /// Name of the state the machine entered.
    pub to: String,
    /// When the transition was taken.
    pub timestamp: DateTime<Utc>,
}

/// Ordered log of the transitions one machine has taken.
///
/// The log is an immutable value: [`record`](TransitionLog::record) returns
/// a new log with the entry appended, leaving the original untouched.
///
/// # Example
///
/// ```rust
/// use cascade::{TransitionLog, TransitionRecord};
/// use chrono::Utc;
///
/// let log = TransitionLog::new();
/// let log = log.record(TransitionRecord {
///     from: "Red".to_string(),
///     to: "Green".to_string(),
///     timestamp: Utc::now(),
/// });
/// let log = log.record(TransitionRecord {
///     from: "Green".to_string(),
///     to: "Amber".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(log.path(), vec!["Red", "Green", "Amber"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionLog {
    records: Vec<TransitionRecord>,
}

impl TransitionLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record, returning a new log.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// All recorded transitions, oldest first.
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    /// The sequence of state names traversed: the first record's `from`,
    /// then the `to` of every record.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from.as_str());
        }
        for record in &self.records {
            path.push(record.to.as_str());
        }
        path
    }

    /// Elapsed time between the first and last recorded transition.
    ///
    /// Returns `None` for an empty log.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }
}
