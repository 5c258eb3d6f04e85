//! Content store directory structure
//!
//! The IDE keeps its content store in its `caches/` directory. Depending on
//! the generation, the store is one or two files:
//!
//! ```text
//! caches/
//! ├── content.dat                      # append-only log (newer IDEs)
//! ├── content.dat.storageRecordIndex   # legacy slot index
//! └── content.dat.storageData          # legacy heap data
//! ```

use std::path::{Path, PathBuf};

/// File name of the append-only-log store.
pub const CONTENT_LOG_FILE: &str = "content.dat";

/// File name of the legacy slot index.
pub const LEGACY_INDEX_FILE: &str = "content.dat.storageRecordIndex";

/// File name of the legacy heap data file.
pub const LEGACY_DATA_FILE: &str = "content.dat.storageData";

/// Paths of the content store files inside a caches directory
#[derive(Debug, Clone)]
pub struct ContentStorePaths {
    root: PathBuf,
}

impl ContentStorePaths {
    /// Create paths from the caches directory
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        ContentStorePaths {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the caches directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the append-only-log file path
    pub fn content_log(&self) -> PathBuf {
        self.root.join(CONTENT_LOG_FILE)
    }

    /// Get the legacy index file path
    pub fn legacy_index(&self) -> PathBuf {
        self.root.join(LEGACY_INDEX_FILE)
    }

    /// Get the legacy data file path
    pub fn legacy_data(&self) -> PathBuf {
        self.root.join(LEGACY_DATA_FILE)
    }

    /// Whether both legacy files are present
    pub fn has_legacy_pair(&self) -> bool {
        self.legacy_index().is_file() && self.legacy_data().is_file()
    }
}
