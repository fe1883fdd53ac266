//! Aggregated execution data for a set of classes.

use indexmap::IndexMap;

use crate::core::errors::Result;
use crate::data::execution::ExecutionData;
use crate::data::visitor::ExecutionDataVisitor;

/// In-memory store of execution data keyed by class id.
///
/// Entries iterate in first-insertion order, which keeps merged output
/// deterministic with respect to the order classes were encountered in the
/// input files.
#[derive(Debug, Clone, Default)]
pub struct ExecutionDataStore {
    entries: IndexMap<u64, ExecutionData>,
}

impl ExecutionDataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add execution data, OR-merging the probes of an already known class.
    pub fn put(&mut self, data: ExecutionData) {
        self.entries
            .entry(data.id)
            .and_modify(|existing| existing.merge_from(&data))
            .or_insert(data);
    }

    /// Look up execution data by class id.
    pub fn get(&self, id: u64) -> Option<&ExecutionData> {
        self.entries.get(&id)
    }

    /// Iterate over all entries in first-insertion order.
    pub fn contents(&self) -> impl Iterator<Item = &ExecutionData> {
        self.entries.values()
    }

    /// Number of classes in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no execution data.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replay every entry to the visitor in first-insertion order.
    pub fn accept<V: ExecutionDataVisitor>(&self, visitor: &mut V) -> Result<()> {
        for data in self.entries.values() {
            visitor.visit_class_execution(data)?;
        }
        Ok(())
    }
}
