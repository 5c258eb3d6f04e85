//! Orphan analysis for localhist
//!
//! Joins the change log against the content store to decide which stored
//! blobs are still referenced:
//! - indexer: Change sets -> content id -> references
//! - classifier: References -> `OrphanStatus`, a pure rule list
//! - detector: Batch queries, summary reports and per-id details
//! - config: Analysis parameters and IDE cache directory discovery
//! - search: Path search, recovery by path and deletion patterns
//!
//! Everything here is computed from a reference map built once per
//! invocation. Rebuild the map to see changes made to the log since.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classifier;
pub mod config;
pub mod detector;
pub mod indexer;
pub mod search;

pub use classifier::classify;
pub use config::{AnalysisConfig, ConfigError, IdeCacheLayout};
pub use detector::{
    AgeBuckets, ConfidenceBands, OrphanAnalysisReport, OrphanCandidate, OrphanDetails,
    OrphanDetector,
};
pub use indexer::{build_reference_map, find_references, sort_by_recency, ReferenceMap};
pub use search::{
    analyze_deletions, recover_by_path, search_paths, DeletionEvent, DeletionReport,
    LargeDeletion, PathMatch, RecoveredContent,
};
