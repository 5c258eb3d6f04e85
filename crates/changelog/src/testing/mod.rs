//! Testing utilities for the change-log decoder
//!
//! - **ChangeSetBuilder**: Encodes one change-set blob
//! - **ChangeLogBuilder**: Lays out an index + data file pair of blobs
//!
//! Timestamps and ids are written through the varint encoding, which holds
//! 32 bits, so builders take them as `i32`.

mod fixtures;

pub use fixtures::{ChangeLogBuilder, ChangeSetBuilder};
