//! Reading and merging of execution data report files.

pub mod merger;
pub mod reader;

pub use merger::{MergeConfig, ReportMerger};
pub use reader::ReportReader;
