//! Execution data of a single class.

use serde::{Deserialize, Serialize};

/// Probe hit vector recorded for one class during a run.
///
/// The id is derived from the class file content by the instrumenting
/// agent, so the same class compiled differently gets different ids. The
/// name is the VM class name, e.g. `com/example/Foo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionData {
    pub id: u64,
    pub name: String,
    pub probes: Vec<bool>,
}

impl ExecutionData {
    /// Create execution data for a single class.
    pub fn new(id: u64, name: impl Into<String>, probes: Vec<bool>) -> Self {
        Self {
            id,
            name: name.into(),
            probes,
        }
    }

    /// Merge another probe vector into this one with a position-wise OR.
    ///
    /// Vectors for the same class id are expected to have equal lengths.
    /// Unequal lengths are not rejected: positions present in both vectors
    /// are OR-combined and a longer incoming vector extends this one.
    pub fn merge_from(&mut self, other: &ExecutionData) {
        for (probe, hit) in self.probes.iter_mut().zip(&other.probes) {
            *probe |= *hit;
        }
        if other.probes.len() > self.probes.len() {
            self.probes.extend_from_slice(&other.probes[self.probes.len()..]);
        }
    }
}
