//! Change-log directory structure
//!
//! The change log lives in the IDE's `LocalHistory/` directory:
//!
//! ```text
//! LocalHistory/
//! ├── changes.storageRecordIndex   # header + 32-byte slots
//! └── changes.storageData          # change-set blobs
//! ```

use std::path::{Path, PathBuf};

/// File name of the change-log index.
pub const CHANGE_LOG_INDEX_FILE: &str = "changes.storageRecordIndex";

/// File name of the change-log data file.
pub const CHANGE_LOG_DATA_FILE: &str = "changes.storageData";

/// Paths of the change-log files inside a LocalHistory directory
#[derive(Debug, Clone)]
pub struct ChangeLogPaths {
    root: PathBuf,
}

impl ChangeLogPaths {
    /// Create paths from the LocalHistory directory
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        ChangeLogPaths {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the LocalHistory directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the index file path
    pub fn index(&self) -> PathBuf {
        self.root.join(CHANGE_LOG_INDEX_FILE)
    }

    /// Get the data file path
    pub fn data(&self) -> PathBuf {
        self.root.join(CHANGE_LOG_DATA_FILE)
    }

    /// Required files that do not exist
    pub fn missing_files(&self) -> Vec<PathBuf> {
        [self.index(), self.data()]
            .into_iter()
            .filter(|p| !p.is_file())
            .collect()
    }

    /// Whether both files exist
    pub fn exists(&self) -> bool {
        self.missing_files().is_empty()
    }
}
