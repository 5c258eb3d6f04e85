//! Change-log decoder for localhist
//!
//! The IDE records every file-system change it observes in a change log: a
//! table of fixed-size slots plus a data file of variable-length blobs. This
//! crate decodes both:
//! - varint: Tag-byte integer and string encoding used inside every blob
//! - index: Change-log header and slot table
//! - decoder: Blob -> `ChangeSet`, and the whole log in one call
//! - paths: Well-known file names inside a change-log directory
//! - testing: Builders for crafting change logs in tests
//!
//! Decoding is read-only and tolerant: a blob that cannot be decoded is
//! reported as absent instead of failing the whole log.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod error;
pub mod index;
pub mod paths;
pub mod testing;
pub mod varint;

pub use decoder::{decode_change_log, decode_change_log_dir, decode_change_set, DecodedChangeLog};
pub use error::{ChangeLogError, ChangeLogResult, VarIntError};
pub use index::{parse_index, parse_index_file, ChangeLogHeader};
pub use paths::ChangeLogPaths;
pub use varint::{VarIntReader, VarIntWriter};
