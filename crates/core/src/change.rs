//! Change-log types
//!
//! A change log is a table of fixed-size slots (`ChangeRecord`) each pointing
//! at one encoded change set blob in a paired data file. Decoding a blob
//! yields a `ChangeSet` holding an ordered list of `Change`s.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ContentId;

/// Kind of a single change, keyed by the numeric code stored in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// 1
    CreateFile,
    /// 2
    CreateDirectory,
    /// 3, the only kind carrying a content id
    ContentChange,
    /// 4
    Rename,
    /// 5
    ROStatusChange,
    /// 6
    Move,
    /// 7
    Delete,
    /// 8
    PutLabel,
    /// 9
    PutSystemLabel,
    /// Any code outside 1..=9, preserved as read
    Unknown(i32),
}

impl ChangeKind {
    /// Map a stored code to its kind.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ChangeKind::CreateFile,
            2 => ChangeKind::CreateDirectory,
            3 => ChangeKind::ContentChange,
            4 => ChangeKind::Rename,
            5 => ChangeKind::ROStatusChange,
            6 => ChangeKind::Move,
            7 => ChangeKind::Delete,
            8 => ChangeKind::PutLabel,
            9 => ChangeKind::PutSystemLabel,
            other => ChangeKind::Unknown(other),
        }
    }

    /// The stored code of this kind.
    pub fn code(&self) -> i32 {
        match self {
            ChangeKind::CreateFile => 1,
            ChangeKind::CreateDirectory => 2,
            ChangeKind::ContentChange => 3,
            ChangeKind::Rename => 4,
            ChangeKind::ROStatusChange => 5,
            ChangeKind::Move => 6,
            ChangeKind::Delete => 7,
            ChangeKind::PutLabel => 8,
            ChangeKind::PutSystemLabel => 9,
            ChangeKind::Unknown(code) => *code,
        }
    }

    /// Structural kinds (codes 1..=7) carry a change id and a path.
    pub fn is_structural(&self) -> bool {
        (1..=7).contains(&self.code())
    }

    /// Label kinds carry neither path nor content.
    pub fn is_label(&self) -> bool {
        matches!(self, ChangeKind::PutLabel | ChangeKind::PutSystemLabel)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::CreateFile => write!(f, "CreateFile"),
            ChangeKind::CreateDirectory => write!(f, "CreateDirectory"),
            ChangeKind::ContentChange => write!(f, "ContentChange"),
            ChangeKind::Rename => write!(f, "Rename"),
            ChangeKind::ROStatusChange => write!(f, "ROStatusChange"),
            ChangeKind::Move => write!(f, "Move"),
            ChangeKind::Delete => write!(f, "Delete"),
            ChangeKind::PutLabel => write!(f, "PutLabel"),
            ChangeKind::PutSystemLabel => write!(f, "PutSystemLabel"),
            ChangeKind::Unknown(code) => write!(f, "Unknown({})", code),
        }
    }
}

/// One change inside a change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Kind of change
    pub kind: ChangeKind,
    /// Affected path, present for structural kinds
    pub path: Option<String>,
    /// Referenced content, present only for `ContentChange`
    pub content_id: Option<ContentId>,
}

/// One committed batch of changes decoded from a single change-log blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Change set id as stored in the blob
    pub id: i64,
    /// Optional human label
    pub name: Option<String>,
    /// Commit time in milliseconds since the epoch
    pub timestamp_millis: i64,
    /// Changes in stored order
    pub changes: Vec<Change>,
}

/// Raw change-log index slot.
///
/// `size <= 0` marks a free or tombstoned slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// 1-based slot number
    pub id: i32,
    /// Byte offset of the blob in the data file
    pub address: i64,
    /// Blob length in bytes
    pub size: i32,
    /// Allocated length in bytes
    pub capacity: i32,
    /// Previous slot in the record chain
    pub prev_id: i32,
    /// Next slot in the record chain
    pub next_id: i32,
    /// Slot timestamp in milliseconds since the epoch
    pub timestamp_millis: i64,
}

impl ChangeRecord {
    /// Whether this slot holds a blob.
    pub fn is_live(&self) -> bool {
        self.size > 0
    }
}
