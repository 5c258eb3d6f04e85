//! localhist - offline reader for IntelliJ LocalHistory and content storage
//!
//! Reads an IDE's on-disk caches without the IDE running: the content blob
//! store, the change log that references it, and an analysis that decides
//! which blobs are no longer referenced.
//!
//! # Quick Start
//!
//! ```ignore
//! use localhist::{decode_change_log_dir, open_store, ContentReader, OrphanDetector};
//!
//! let store = open_store(caches_dir)?;
//! let log = decode_change_log_dir(local_history_dir)?;
//! let detector = OrphanDetector::from_change_log(&log);
//!
//! for candidate in detector.find_orphaned(store.list_content_ids(), 0.7, Some(20), chrono::Utc::now()) {
//!     println!("{}: {}", candidate.content_id, candidate.status);
//! }
//! ```
//!
//! # Architecture
//!
//! - `localhist-core`: shared data model
//! - `localhist-storage`: content store readers (append-only log and legacy
//!   paged store)
//! - `localhist-changelog`: change-log index and blob decoder
//! - `localhist-analysis`: reference indexer, classifier, detector and path
//!   queries
//!
//! Everything is synchronous, read-only and single-threaded.

pub use localhist_analysis as analysis;
pub use localhist_changelog as changelog;
pub use localhist_core as core;
pub use localhist_storage as storage;

pub use localhist_analysis::{
    analyze_deletions, build_reference_map, classify, find_references, recover_by_path,
    search_paths, AnalysisConfig, ConfigError, DeletionReport, IdeCacheLayout,
    OrphanAnalysisReport, OrphanCandidate, OrphanDetails, OrphanDetector, PathMatch,
    RecoveredContent, ReferenceMap,
};
pub use localhist_changelog::{
    decode_change_log, decode_change_log_dir, decode_change_set, ChangeLogError, ChangeLogHeader,
    DecodedChangeLog,
};
pub use localhist_core::{
    Change, ChangeKind, ChangeRecord, ChangeSet, ContentId, ContentRecord, ContentReference,
    OrphanStatus, StorageFormat,
};
pub use localhist_storage::{
    detect_format, open_store, ContentReader, ContentScanner, ContentStore, ScanConfig,
    StoreError,
};
