//! Visitor interfaces for decoded records and per-session aggregation.

use indexmap::IndexMap;

use crate::core::errors::{ExecMergeError, Result};
use crate::data::execution::ExecutionData;
use crate::data::session::SessionInfo;
use crate::data::store::ExecutionDataStore;

/// Callback for session info records in decode order.
pub trait SessionInfoVisitor {
    /// Called once per session info record.
    fn visit_session_info(&mut self, info: &SessionInfo) -> Result<()>;
}

/// Callback for per-class execution data records in decode order.
pub trait ExecutionDataVisitor {
    /// Called once per execution data record.
    fn visit_class_execution(&mut self, data: &ExecutionData) -> Result<()>;
}

/// Groups execution data by session name across any number of input files.
///
/// Records are routed into the store of the most recently visited session,
/// mirroring their position in the stream: an agent writes all session info
/// records first or interleaves them, and each execution data record
/// belongs to the session announced before it. Session names repeat across
/// files; their data accumulates in one store per name, created in
/// first-encountered order. An overall store additionally merges every
/// class across all sessions.
#[derive(Debug, Default)]
pub struct SessionAccumulator {
    sessions: IndexMap<String, ExecutionDataStore>,
    merged: ExecutionDataStore,
    current: Option<String>,
}

impl SessionAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate sessions and their stores in first-encountered order.
    pub fn sessions(&self) -> impl Iterator<Item = (&str, &ExecutionDataStore)> {
        self.sessions
            .iter()
            .map(|(id, store)| (id.as_str(), store))
    }

    /// Number of distinct session names seen so far.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Execution data merged across every session.
    pub fn merged(&self) -> &ExecutionDataStore {
        &self.merged
    }
}

impl SessionInfoVisitor for SessionAccumulator {
    fn visit_session_info(&mut self, info: &SessionInfo) -> Result<()> {
        self.current = Some(info.id.clone());
        self.sessions.entry(info.id.clone()).or_default();
        Ok(())
    }
}

impl ExecutionDataVisitor for SessionAccumulator {
    fn visit_class_execution(&mut self, data: &ExecutionData) -> Result<()> {
        let Some(session) = &self.current else {
            return Err(ExecMergeError::decode(format!(
                "Execution data for class {} precedes any session info record",
                data.name
            )));
        };
        self.sessions
            .entry(session.clone())
            .or_default()
            .put(data.clone());
        self.merged.put(data.clone());
        Ok(())
    }
}
