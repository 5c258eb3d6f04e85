//! Analysis configuration
//!
//! Where the content store and change log live, and how strict an orphan
//! query is. A JetBrains cache root holds one directory per installed IDE
//! version:
//!
//! ```text
//! JetBrains/
//! ├── IntelliJIdea2024.3/
//! └── IntelliJIdea2025.1/
//!     ├── caches/          # content store
//!     └── LocalHistory/    # change log
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::classifier::MEDIUM_CONFIDENCE;

/// Prefix of IntelliJ IDEA cache directories.
pub const IDE_DIR_PREFIX: &str = "IntelliJIdea";

/// Subdirectory holding the content store.
pub const CACHES_DIR: &str = "caches";

/// Subdirectory holding the change log.
pub const LOCAL_HISTORY_DIR: &str = "LocalHistory";

/// Parameters of an orphan analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Directory holding the content store
    pub store_dir: PathBuf,
    /// Directory holding the change log
    pub change_log_dir: PathBuf,
    /// Minimum confidence for an uncertain verdict to be reported
    pub min_confidence: f32,
    /// Maximum number of candidates reported
    pub limit: Option<usize>,
}

impl AnalysisConfig {
    /// Config for explicit store and change-log directories
    pub fn new(store_dir: impl Into<PathBuf>, change_log_dir: impl Into<PathBuf>) -> Self {
        AnalysisConfig {
            store_dir: store_dir.into(),
            change_log_dir: change_log_dir.into(),
            min_confidence: MEDIUM_CONFIDENCE,
            limit: None,
        }
    }

    /// Config for the directories of one IDE installation
    pub fn from_layout(layout: &IdeCacheLayout) -> Self {
        Self::new(layout.caches_dir(), layout.local_history_dir())
    }

    /// Set minimum confidence
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Set result limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::InvalidConfidence(self.min_confidence));
        }
        if self.limit == Some(0) {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }
}

/// Directories of one IDE installation's caches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeCacheLayout {
    ide_dir: PathBuf,
}

impl IdeCacheLayout {
    /// Use a specific IDE cache directory
    pub fn from_ide_dir(ide_dir: impl Into<PathBuf>) -> Self {
        IdeCacheLayout {
            ide_dir: ide_dir.into(),
        }
    }

    /// Pick the most recently modified IntelliJ IDEA directory under `root`.
    ///
    /// Directories with equal modification times are ordered by name, the
    /// greatest winning.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let entries = std::fs::read_dir(root).map_err(|source| ConfigError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let mut best: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(IDE_DIR_PREFIX) {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_dir() {
                continue;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let candidate = (modified, entry.path());
            if best.as_ref().map_or(true, |b| candidate > *b) {
                best = Some(candidate);
            }
        }

        match best {
            Some((_, ide_dir)) => {
                debug!(root = %root.display(), ide_dir = %ide_dir.display(), "Discovered IDE cache directory");
                Ok(IdeCacheLayout { ide_dir })
            }
            None => Err(ConfigError::NoIdeCache {
                root: root.to_path_buf(),
            }),
        }
    }

    /// The IDE cache directory
    pub fn ide_dir(&self) -> &Path {
        &self.ide_dir
    }

    /// Content store directory
    pub fn caches_dir(&self) -> PathBuf {
        self.ide_dir.join(CACHES_DIR)
    }

    /// Change-log directory
    pub fn local_history_dir(&self) -> PathBuf {
        self.ide_dir.join(LOCAL_HISTORY_DIR)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Confidence outside `[0, 1]`
    #[error("Invalid minimum confidence {0}: must be within [0, 1]")]
    InvalidConfidence(f32),

    /// A limit of zero would report nothing
    #[error("Result limit must be positive")]
    ZeroLimit,

    /// No IDE cache directory under the root
    #[error("No IntelliJIdea* directory found in {root}")]
    NoIdeCache {
        /// Cache root that was searched
        root: PathBuf,
    },

    /// The cache root could not be listed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Directory being listed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}
