//! Content store error types
//!
//! Only precondition violations are errors: a missing file, a bad magic, a
//! header too short to hold its fixed fields, or an I/O failure while
//! opening. Corruption inside individual records surfaces as `None` from the
//! readers and never as a `StoreError`.

use std::io;
use std::path::PathBuf;

/// Result type for content store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised when opening a content store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The directory holds neither store generation
    #[error("No valid content storage found in {dir}")]
    NotFound {
        /// Directory that was inspected
        dir: PathBuf,
    },

    /// A file the format requires is absent
    #[error("Missing {what} at {path}")]
    MissingFile {
        /// Role of the missing file
        what: &'static str,
        /// Expected location
        path: PathBuf,
    },

    /// The file does not start with the expected magic
    #[error("Invalid magic in {path}: expected {expected:#010x}, got {actual:#010x}")]
    InvalidMagic {
        /// File that was opened
        path: PathBuf,
        /// Magic the format requires
        expected: u32,
        /// Magic found on disk
        actual: u32,
    },

    /// The file is shorter than its fixed header
    #[error("Truncated header in {path}: {size} bytes, need {needed}")]
    TruncatedHeader {
        /// File that was opened
        path: PathBuf,
        /// Actual file size
        size: u64,
        /// Header size of the format
        needed: u64,
    },

    /// I/O failure while opening or reading a header
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    /// Wrap an I/O error, mapping `NotFound` to `MissingFile`.
    pub(crate) fn from_io(what: &'static str, path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::MissingFile { what, path }
        } else {
            StoreError::Io { path, source }
        }
    }

    /// Whether the error means "no store here" rather than a damaged store.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::MissingFile { .. }
        )
    }
}
