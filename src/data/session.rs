//! Session metadata records.

use serde::{Deserialize, Serialize};

/// Metadata about a single execution data session, typically one test run.
///
/// Timestamps are epoch milliseconds as recorded by the agent. Merged
/// output does not preserve them; sessions written by the merger carry
/// zeroed timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub start: i64,
    pub dump: i64,
}

impl SessionInfo {
    /// Create session metadata.
    pub fn new(id: impl Into<String>, start: i64, dump: i64) -> Self {
        Self {
            id: id.into(),
            start,
            dump,
        }
    }
}
