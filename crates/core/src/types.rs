//! Content store types
//!
//! A content store maps dense integer ids to immutable blobs. The same integer
//! means a different record depending on the store generation, so ids are
//! only comparable within one `StorageFormat`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::limits::CONTENT_HASH_LEN;
use crate::text::looks_like_text;

/// Identifier of one blob inside a content store generation.
pub type ContentId = i32;

/// On-disk generation of a content store.
///
/// Determined once when a directory is opened and fixed for the lifetime of
/// the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageFormat {
    /// Fixed-slot index file plus heap data file
    LegacyPaged,
    /// Self-describing append-only log in a single `content.dat`
    AppendOnlyLog,
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageFormat::LegacyPaged => write!(f, "legacy-paged"),
            StorageFormat::AppendOnlyLog => write!(f, "append-only-log"),
        }
    }
}

/// A blob decoded from a content store.
///
/// `crypto_hash` is copied verbatim from storage and never recomputed.
/// Equality is by `content_id` only.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRecord {
    /// Id the record was read under
    pub content_id: ContentId,
    /// Stored hash of the uncompressed content
    pub crypto_hash: [u8; CONTENT_HASH_LEN],
    /// Whether the stored payload was flagged as compressed
    pub is_compressed: bool,
    /// Declared uncompressed size
    pub uncompressed_size: i32,
    /// Content bytes, decompressed on a best-effort basis
    pub content: Vec<u8>,
}

impl ContentRecord {
    /// Lowercase hex rendering of the stored hash.
    pub fn crypto_hash_hex(&self) -> String {
        self.crypto_hash
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    pub fn content_as_string(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Heuristic check whether the content is text.
    pub fn is_text(&self) -> bool {
        looks_like_text(&self.content)
    }
}

impl PartialEq for ContentRecord {
    fn eq(&self, other: &Self) -> bool {
        self.content_id == other.content_id
    }
}

impl Eq for ContentRecord {}
