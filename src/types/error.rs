//! Error types for csvdelta

use std::fmt;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which input a header-related error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Sort input
    Source,
    /// Authoritative compare input
    Primary,
    /// Compare input checked against the primary
    Secondary,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Primary => f.write_str("primary"),
            Side::Secondary => f.write_str("secondary"),
        }
    }
}

/// Error types for csvdelta operations
#[derive(Debug, Error)]
pub enum CsvDeltaError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named column is not present in a header
    #[error("Configuration error: column '{column}' not found in {side} header")]
    MissingColumn { column: String, side: Side },

    /// Row field count disagrees with its header
    #[error("Data shape error: record on line {line} has {found} fields, expected {expected}")]
    DataShape {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Malformed delimited syntax reported by the CSV reader
    #[error("Parse error: {0}")]
    Parse(String),

    /// Comparator could not order two rows
    #[error("Comparator error: {0}")]
    Comparator(String),

    /// Permission denied for specific path
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Disk full while writing a run or the destination
    #[error("Disk full while writing {path}")]
    DiskFull { path: PathBuf },
}

impl CsvDeltaError {
    /// Check if this error was raised before any rows were processed
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CsvDeltaError::Config(_) | CsvDeltaError::MissingColumn { .. }
        )
    }

    /// Check if this error is a field count mismatch
    pub fn is_data_shape_error(&self) -> bool {
        matches!(self, CsvDeltaError::DataShape { .. })
    }

    /// Check if this error is a filesystem failure
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            CsvDeltaError::Io(_)
                | CsvDeltaError::PermissionDenied { .. }
                | CsvDeltaError::DiskFull { .. }
        )
    }
}

impl From<csv::Error> for CsvDeltaError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|p| p.line()).unwrap_or(0);
        match error.into_kind() {
            csv::ErrorKind::Io(io) => CsvDeltaError::Io(io),
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => CsvDeltaError::DataShape {
                line: pos.map(|p| p.line()).unwrap_or(line),
                expected: expected_len as usize,
                found: len as usize,
            },
            csv::ErrorKind::Utf8 { pos, err } => CsvDeltaError::Parse(format!(
                "invalid UTF-8 on line {}: {}",
                pos.map(|p| p.line()).unwrap_or(line),
                err
            )),
            other => CsvDeltaError::Parse(format!("{:?}", other)),
        }
    }
}

/// Classify a filesystem error raised while touching `path`
pub fn map_file_error(path: &Path, error: Error) -> CsvDeltaError {
    if matches!(error.kind(), ErrorKind::PermissionDenied) {
        CsvDeltaError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else if matches!(error.kind(), ErrorKind::StorageFull)
        || matches!(error.raw_os_error(), Some(28 | 122))
    {
        CsvDeltaError::DiskFull {
            path: path.to_path_buf(),
        }
    } else {
        CsvDeltaError::Io(error)
    }
}
