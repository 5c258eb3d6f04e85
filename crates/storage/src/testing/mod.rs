//! Testing utilities for content store readers
//!
//! Builders that lay out byte-exact store files so tests can exercise the
//! readers against healthy, truncated and corrupt data without an IDE:
//!
//! - **AolFileBuilder**: `content.dat` in append-only-log format
//! - **LegacyStoreBuilder**: legacy index + data file pair
//! - **overwrite_at**: in-place corruption of an existing file
//!
//! # Example
//!
//! ```ignore
//! use localhist_storage::testing::AolFileBuilder;
//!
//! AolFileBuilder::new()
//!     .record(b"hello")
//!     .raw_field(0) // append point
//!     .write_to(&dir.join("content.dat"))?;
//! ```

mod fixtures;

pub use fixtures::{overwrite_at, AolFileBuilder, LegacyStoreBuilder};
