//! # Execmerge: JaCoCo Execution Data Merging
//!
//! A Rust implementation of JaCoCo binary execution data (`.exec`)
//! processing. This library decodes, aggregates and re-encodes the probe
//! data produced by independent test runs:
//!
//! - **Dual format support**: reads both the current (`0x1007`) and the
//!   legacy (`0x1006`) binary format, detected from the stream header
//! - **Session aggregation**: groups per-class probe vectors by session
//!   name across any number of input files
//! - **OR-merge semantics**: probe vectors for the same class id combine
//!   position-wise, so a probe counts as hit if any run hit it
//! - **Fail-fast validation**: mixed format versions and undecodable
//!   streams abort the merge before any output is written
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │               Report Merger                │
//! ├─────────────┬───────────────┬──────────────┤
//! │ Report      │  Data Model   │ Format Codec │
//! │ Reader      │ • Store       │ • Reader     │
//! │ • Detection │ • Sessions    │ • Writer     │
//! │ • Decode    │ • Visitors    │ • Versions   │
//! └─────────────┴───────────────┴──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//!
//! use execmerge::ReportMerger;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let inputs = vec![PathBuf::from("ut.exec"), PathBuf::from("it.exec")];
//!     ReportMerger::new().merge_reports(Path::new("merged.exec"), &inputs)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core error types
pub mod core {
    //! Core error types and result alias.

    pub mod errors;
}

// In-memory execution data model
pub mod data {
    //! Execution data model: classes, sessions, stores and visitors.

    pub mod execution;
    pub mod session;
    pub mod store;
    pub mod visitor;
}

// Binary format codec
pub mod format;

// Report reading and merging
pub mod merge;

// Re-export primary types for convenience
pub use crate::core::errors::{ExecMergeError, Result, ResultExt};
pub use crate::data::execution::ExecutionData;
pub use crate::data::session::SessionInfo;
pub use crate::data::store::ExecutionDataStore;
pub use crate::data::visitor::{ExecutionDataVisitor, SessionAccumulator, SessionInfoVisitor};
pub use crate::format::{ExecutionDataReader, ExecutionDataWriter, FormatVersion};
pub use crate::merge::{MergeConfig, ReportMerger, ReportReader};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
