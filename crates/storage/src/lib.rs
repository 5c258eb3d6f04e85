//! Content store readers for localhist
//!
//! This crate reads the IDE's content blob store directly from disk:
//! - detect: Picks a reader from a directory's magic bytes
//! - aol: Append-only-log reader (single `content.dat`)
//! - legacy: Legacy paged-store reader (index file + heap data file)
//! - codec: Shared LZ4 / inflate / passthrough decompression
//! - reader: `ContentReader` contract and the `ContentStore` handle
//! - scanner: Filtered, lazy traversal of every record in a store
//! - testing: Builders for crafting store files in tests
//!
//! All readers are read-only, synchronous and single-threaded. Open one
//! reader per thread when scanning in parallel.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aol;
pub mod codec;
pub mod detect;
pub mod error;
pub mod legacy;
pub mod paths;
pub mod reader;
pub mod scanner;
pub mod testing;

mod record;

pub use aol::{offset_to_record_id, record_id_to_offset, AolContentIds, AppendOnlyLogReader};
pub use codec::decompress;
pub use detect::detect_format;
pub use error::{StoreError, StoreResult};
pub use legacy::{LegacyContentIds, LegacyPagedReader, LegacySlot};
pub use paths::ContentStorePaths;
pub use reader::{open_store, ContentReader, ContentStore};
pub use scanner::{ContentMetadata, ContentScanResult, ContentScanner, ScanConfig};
