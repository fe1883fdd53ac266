//! Merging of multiple execution data reports into one output report.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::errors::{ExecMergeError, Result};
use crate::data::session::SessionInfo;
use crate::data::visitor::{SessionAccumulator, SessionInfoVisitor};
use crate::format::writer::ExecutionDataWriter;
use crate::format::FormatVersion;
use crate::merge::reader::ReportReader;

/// Configuration for report merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Format version of the merged report when no input file exists.
    #[serde(default = "default_format")]
    pub default_format: FormatVersion,
}

fn default_format() -> FormatVersion {
    FormatVersion::Current
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_format: default_format(),
        }
    }
}

/// Merges execution data reports into a single consolidated report.
#[derive(Debug)]
pub struct ReportMerger {
    pub config: MergeConfig,
}

impl ReportMerger {
    /// Create a merger with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MergeConfig::default())
    }

    /// Create a merger with the given configuration.
    pub fn with_config(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Merge the given report files into one output report.
    ///
    /// Input files that do not exist are skipped. All existing inputs must
    /// share one binary format version; the merged report is written in
    /// that version, or in the configured default when no input exists.
    /// The output file is only created once every input has been read, so
    /// a decode or format mismatch failure leaves no output behind.
    ///
    /// The merged report contains one session per distinct session name in
    /// first-encountered order, each carrying zeroed timestamps and one
    /// execution data record per class of that session.
    pub fn merge_reports(&self, output: &Path, inputs: &[PathBuf]) -> Result<()> {
        let mut accumulator = SessionAccumulator::new();
        let (version, files_read) = self.load_source_files(&mut accumulator, inputs)?;
        let version = version.unwrap_or(self.config.default_format);

        self.write_merged_report(output, &accumulator, version)
            .map_err(|err| match err {
                ExecMergeError::Io { source, .. } => ExecMergeError::io(
                    format!(
                        "Unable to write merged execution data report {}",
                        output.display()
                    ),
                    source,
                ),
                other => other,
            })?;

        info!(
            "Merged {} execution data files into {} ({} sessions, {} classes)",
            files_read,
            output.display(),
            accumulator.session_count(),
            accumulator.merged().len()
        );
        Ok(())
    }

    fn load_source_files(
        &self,
        accumulator: &mut SessionAccumulator,
        inputs: &[PathBuf],
    ) -> Result<(Option<FormatVersion>, usize)> {
        let mut expected: Option<FormatVersion> = None;
        let mut files_read = 0;

        for path in inputs {
            if !path.is_file() {
                debug!("Skipping missing execution data file {}", path.display());
                continue;
            }

            let reader = ReportReader::new(path)?;
            match expected {
                None => expected = Some(reader.format_version()),
                Some(version) if version != reader.format_version() => {
                    return Err(ExecMergeError::format_mismatch(
                        version,
                        reader.format_version(),
                        path,
                    ));
                }
                Some(_) => {}
            }

            reader.read_into(accumulator)?;
            files_read += 1;
        }

        Ok((expected, files_read))
    }

    fn write_merged_report(
        &self,
        path: &Path,
        accumulator: &SessionAccumulator,
        version: FormatVersion,
    ) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = ExecutionDataWriter::new(BufWriter::new(file), version)?;

        for (session_id, store) in accumulator.sessions() {
            // timestamps are not preserved across a merge
            writer.visit_session_info(&SessionInfo::new(session_id, 0, 0))?;
            store.accept(&mut writer)?;
        }

        writer.flush()
    }
}

impl Default for ReportMerger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_current_format() {
        assert_eq!(MergeConfig::default().default_format, FormatVersion::Current);
    }

    #[test]
    fn test_with_config_keeps_default_format() {
        let merger = ReportMerger::with_config(MergeConfig {
            default_format: FormatVersion::Legacy,
        });
        assert_eq!(merger.config.default_format, FormatVersion::Legacy);
    }
}
