//! Orphan classification.
//!
//! A content id's references are matched against an ordered rule list; the
//! first rule that applies decides:
//!
//! ```text
//! 1. no references                          -> Uncertain(0.9)
//! 2. every reference is a Delete            -> Orphaned
//! 3. last Delete after last ContentChange   -> Orphaned
//!    (or a Delete and no ContentChange)
//! 4. age of the most recent reference:
//!      < 7 days                             -> Active
//!      30..90 days                          -> Uncertain(0.7)
//!      >= 90 days                           -> Uncertain(0.9)
//! 5. ContentChange and no Delete            -> Active
//! 6. otherwise                              -> Uncertain(0.5)
//! ```
//!
//! The confidence levels and day boundaries are fixed. Downstream tooling
//! compares against these exact values.

use chrono::{DateTime, Utc};

use localhist_core::{ContentReference, OrphanStatus};

/// Confidence for very old or entirely unreferenced content.
pub const HIGH_CONFIDENCE: f32 = 0.9;
/// Confidence for content untouched for a month or more.
pub const MEDIUM_CONFIDENCE: f32 = 0.7;
/// Confidence when references point both ways.
pub const LOW_CONFIDENCE: f32 = 0.5;

/// References younger than this keep content active.
pub const RECENT_DAYS: i64 = 7;
/// Lower bound of the medium-confidence age band.
pub const OLD_DAYS: i64 = 30;
/// Lower bound of the high-confidence age band.
pub const VERY_OLD_DAYS: i64 = 90;

fn millis(r: &ContentReference) -> i64 {
    r.timestamp_millis.unwrap_or(0)
}

/// Latest reference by timestamp; the earliest listed wins ties.
fn latest<'a, I>(refs: I) -> Option<&'a ContentReference>
where
    I: IntoIterator<Item = &'a ContentReference>,
{
    refs.into_iter()
        .reduce(|best, r| if millis(r) > millis(best) { r } else { best })
}

fn uncertain(confidence: f32, reason: impl Into<String>) -> OrphanStatus {
    OrphanStatus::Uncertain {
        confidence,
        reason: reason.into(),
    }
}

/// Classify one content id from all of its references.
///
/// Reference order does not matter. `now` anchors the age rules.
pub fn classify(references: &[ContentReference], now: DateTime<Utc>) -> OrphanStatus {
    if references.is_empty() {
        return uncertain(HIGH_CONFIDENCE, "no references found");
    }

    if references.iter().all(ContentReference::is_delete) {
        return OrphanStatus::Orphaned;
    }

    let has_delete = references.iter().any(ContentReference::is_delete);
    let has_content_change = references.iter().any(ContentReference::is_content_change);

    if let Some(last_delete) = latest(references.iter().filter(|r| r.is_delete())) {
        let last_change = latest(references.iter().filter(|r| r.is_content_change()));
        match last_change {
            None => return OrphanStatus::Orphaned,
            Some(change) if millis(last_delete) > millis(change) => {
                return OrphanStatus::Orphaned
            }
            Some(_) => {}
        }
    }

    if let Some(last_seen) = latest(references).and_then(ContentReference::timestamp) {
        let days = (now - last_seen).num_days();
        if days < RECENT_DAYS {
            return OrphanStatus::Active;
        }
        if (OLD_DAYS..VERY_OLD_DAYS).contains(&days) {
            return uncertain(MEDIUM_CONFIDENCE, format!("no references for {days} days"));
        }
        if days >= VERY_OLD_DAYS {
            return uncertain(
                HIGH_CONFIDENCE,
                format!("no references for {days} days (very old)"),
            );
        }
    }

    if has_content_change && !has_delete {
        return OrphanStatus::Active;
    }

    uncertain(LOW_CONFIDENCE, "mixed or unclear reference pattern")
}
