//! Error types for the execmerge library.
//!
//! This module provides structured error handling for all execmerge
//! operations, preserving the failing file path and the underlying cause so
//! callers can report decode, format and I/O failures precisely.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::FormatVersion;

/// Main result type for execmerge operations.
pub type Result<T> = std::result::Result<T, ExecMergeError>;

/// Comprehensive error type for all execmerge operations.
#[derive(Error, Debug)]
pub enum ExecMergeError {
    /// I/O related errors (file operations, stream writes, etc.)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Binary decode errors: the bytes match neither known format grammar
    #[error("Invalid execution data: {message}")]
    Decode {
        /// Error description
        message: String,
        /// File being decoded when the error occurred (if known)
        path: Option<PathBuf>,
    },

    /// Two inputs were written by different binary format versions
    #[error(
        "Incompatible execution data formats: {} uses the {found} format but \
         previous inputs use the {expected} format",
        .path.display()
    )]
    FormatMismatch {
        /// Format version established by the first input
        expected: FormatVersion,
        /// Format version of the offending input
        found: FormatVersion,
        /// Path of the offending input
        path: PathBuf,
    },
}

impl ExecMergeError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            path: None,
        }
    }

    /// Create a new format mismatch error
    pub fn format_mismatch(
        expected: FormatVersion,
        found: FormatVersion,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::FormatMismatch {
            expected,
            found,
            path: path.into(),
        }
    }

    /// Attach the file path to an existing error
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        match &mut self {
            Self::Decode { path: p, .. } => {
                *p = Some(path.into());
            }
            _ => {} // Other variants already carry their path
        }
        self
    }
}

// Implement From traits for common error types
impl From<io::Error> for ExecMergeError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

/// Result extension trait for attaching file paths to errors
pub trait ResultExt<T> {
    /// Attach the file path to an error result
    fn with_path<P: Into<PathBuf>>(self, path: P) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ExecMergeError>,
{
    fn with_path<P: Into<PathBuf>>(self, path: P) -> Result<T> {
        self.map_err(|e| e.into().with_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = ExecMergeError::decode("Truncated block");
        assert!(matches!(err, ExecMergeError::Decode { .. }));

        let err = ExecMergeError::format_mismatch(
            FormatVersion::Current,
            FormatVersion::Legacy,
            "b.exec",
        );
        assert!(matches!(err, ExecMergeError::FormatMismatch { .. }));
    }

    #[test]
    fn test_io_error_creation() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access denied");
        let err = ExecMergeError::io("Unable to write merged report", io_err);

        if let ExecMergeError::Io { message, source } = &err {
            assert_eq!(message, "Unable to write merged report");
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        } else {
            panic!("Expected Io error");
        }
    }

    #[test]
    fn test_error_with_path() {
        let err = ExecMergeError::decode("Unknown block type 0x42").with_path("a.exec");

        if let ExecMergeError::Decode { path, .. } = err {
            assert_eq!(path, Some(PathBuf::from("a.exec")));
        } else {
            panic!("Expected Decode error");
        }
    }

    #[test]
    fn test_with_path_non_decode_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = ExecMergeError::io("Unable to read report", io_err).with_path("a.exec");

        // Io errors carry the path in their message, so the path is a no-op
        if let ExecMergeError::Io { message, .. } = err {
            assert_eq!(message, "Unable to read report");
        } else {
            panic!("Expected Io error");
        }
    }

    #[test]
    fn test_result_extension() {
        let result: std::result::Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "Unexpected end of stream",
        ));

        let merge_result = result.with_path(Path::new("broken.exec"));
        assert!(merge_result.is_err());
        assert!(matches!(
            merge_result.unwrap_err(),
            ExecMergeError::Io { .. }
        ));
    }

    #[test]
    fn test_format_mismatch_fields() {
        let err = ExecMergeError::format_mismatch(
            FormatVersion::Legacy,
            FormatVersion::Current,
            "reports/b.exec",
        );

        if let ExecMergeError::FormatMismatch {
            expected,
            found,
            path,
        } = err
        {
            assert_eq!(expected, FormatVersion::Legacy);
            assert_eq!(found, FormatVersion::Current);
            assert_eq!(path, PathBuf::from("reports/b.exec"));
        } else {
            panic!("Expected FormatMismatch error");
        }
    }

    #[test]
    fn test_error_display_formatting() {
        let err = ExecMergeError::format_mismatch(
            FormatVersion::Current,
            FormatVersion::Legacy,
            "b.exec",
        );
        let display = format!("{}", err);
        assert!(display.contains("b.exec"));
        assert!(display.contains("legacy"));
        assert!(display.contains("current"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let merge_err: ExecMergeError = io_err.into();

        assert!(matches!(merge_err, ExecMergeError::Io { .. }));
    }
}
