//! Content references and orphan verdicts

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::change::ChangeKind;
use crate::types::ContentId;

/// A change that points at a content id, stamped with its change set's time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReference {
    /// Referenced content
    pub content_id: ContentId,
    /// Path the change applied to
    pub path: Option<String>,
    /// Timestamp of the owning change set, in milliseconds since the epoch
    pub timestamp_millis: Option<i64>,
    /// Kind of the referencing change
    pub change_kind: ChangeKind,
}

impl ContentReference {
    /// Whether the referencing change is a delete.
    pub fn is_delete(&self) -> bool {
        self.change_kind == ChangeKind::Delete
    }

    /// Whether the referencing change is a content change.
    pub fn is_content_change(&self) -> bool {
        self.change_kind == ChangeKind::ContentChange
    }

    /// Reference time, when present and representable.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp_millis
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

/// Verdict on whether a content id is still referenced.
///
/// Computed fresh from a reference map on every query; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrphanStatus {
    /// Content is still in use
    Active,
    /// Content is no longer referenced
    Orphaned,
    /// Content is probably unreferenced
    Uncertain {
        /// Confidence in `(0, 1]` that the content is orphaned
        confidence: f32,
        /// Why the verdict is uncertain
        reason: String,
    },
}

impl OrphanStatus {
    /// Whether this verdict is `Orphaned`.
    pub fn is_orphaned(&self) -> bool {
        matches!(self, OrphanStatus::Orphaned)
    }

    /// Whether this verdict is `Active`.
    pub fn is_active(&self) -> bool {
        matches!(self, OrphanStatus::Active)
    }

    /// Confidence of an `Uncertain` verdict.
    pub fn confidence(&self) -> Option<f32> {
        match self {
            OrphanStatus::Uncertain { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }
}

impl fmt::Display for OrphanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanStatus::Active => write!(f, "Active"),
            OrphanStatus::Orphaned => write!(f, "Orphaned"),
            OrphanStatus::Uncertain { confidence, reason } => write!(
                f,
                "Uncertain (confidence: {:.0}%, reason: {})",
                confidence * 100.0,
                reason
            ),
        }
    }
}
