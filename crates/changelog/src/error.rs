//! Change-log error types
//!
//! `ChangeLogError` covers the precondition failures of opening a log.
//! `VarIntError` is internal to blob decoding: the decoder absorbs it and
//! reports the affected change set, or the rest of it, as absent.

use std::io;
use std::path::PathBuf;

/// Result type for change-log operations
pub type ChangeLogResult<T> = Result<T, ChangeLogError>;

/// Errors raised when opening a change log
#[derive(Debug, thiserror::Error)]
pub enum ChangeLogError {
    /// A file the log requires is absent
    #[error("Missing {what} at {path}")]
    MissingFile {
        /// Role of the missing file
        what: &'static str,
        /// Expected location
        path: PathBuf,
    },

    /// The index is shorter than its fixed header
    #[error("Truncated change-log header in {path}: {size} bytes, need {needed}")]
    TruncatedHeader {
        /// Index file
        path: PathBuf,
        /// Actual file size
        size: u64,
        /// Header size of the format
        needed: u64,
    },

    /// I/O failure while reading a log file
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl ChangeLogError {
    pub(crate) fn from_io(what: &'static str, path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ChangeLogError::MissingFile { what, path }
        } else {
            ChangeLogError::Io { path, source }
        }
    }

    /// Whether the error means "no change log here".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChangeLogError::MissingFile { .. })
    }
}

/// Failure decoding a varint-encoded value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VarIntError {
    /// The value runs past the end of the blob
    #[error("Unexpected end of data at offset {offset}: need {needed} bytes, {available} left")]
    UnexpectedEof {
        /// Offset the value starts at
        offset: usize,
        /// Bytes the value needs
        needed: usize,
        /// Bytes remaining
        available: usize,
    },

    /// A string length decoded negative
    #[error("Negative string length {length} at offset {offset}")]
    NegativeLength {
        /// Offset of the length prefix
        offset: usize,
        /// Decoded length
        length: i32,
    },
}
