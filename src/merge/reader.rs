//! Per-file report reading with format version detection.

use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::errors::{ExecMergeError, Result, ResultExt};
use crate::data::visitor::{ExecutionDataVisitor, SessionInfoVisitor};
use crate::format::reader::ExecutionDataReader;
use crate::format::{FormatVersion, HEADER_LEN};

/// Reads a single execution data report file.
///
/// The binary format version is detected from the leading header bytes
/// when the reader is constructed, so callers can compare versions across
/// files before decoding any records.
#[derive(Debug)]
pub struct ReportReader {
    path: PathBuf,
    version: FormatVersion,
}

impl ReportReader {
    /// Open a report file and detect its binary format version.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let version = detect_version(&path)?;
        if !version.is_current() {
            warn!(
                "{} was written by the legacy binary format, consider upgrading the agent \
                 that produced it",
                path.display()
            );
        }
        Ok(Self { path, version })
    }

    /// The detected binary format version of the file.
    pub fn format_version(&self) -> FormatVersion {
        self.version
    }

    /// Whether the file was written by the current binary format.
    pub fn uses_current_binary_format(&self) -> bool {
        self.version.is_current()
    }

    /// Decode every record in the file into the visitor.
    pub fn read_into<V>(&self, visitor: &mut V) -> Result<()>
    where
        V: SessionInfoVisitor + ExecutionDataVisitor,
    {
        debug!("Analysing {}", self.path.display());
        let bytes = fs::read(&self.path).map_err(|err| {
            ExecMergeError::io(
                format!("Unable to read execution data file {}", self.path.display()),
                err,
            )
        })?;

        let mut reader = ExecutionDataReader::new(Cursor::new(bytes), self.version);
        reader.read(visitor).with_path(&self.path)
    }
}

fn detect_version(path: &Path) -> Result<FormatVersion> {
    let mut file = File::open(path).map_err(|err| {
        ExecMergeError::io(
            format!("Unable to read execution data file {}", path.display()),
            err,
        )
    })?;

    let mut header = [0u8; HEADER_LEN];
    match file.read_exact(&mut header) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ExecMergeError::decode(
                "File is too short to contain an execution data header",
            )
            .with_path(path));
        }
        Err(err) => {
            return Err(ExecMergeError::io(
                format!("Unable to read execution data file {}", path.display()),
                err,
            ));
        }
    }

    FormatVersion::detect(&header).map_err(|err| err.with_path(path))
}
