//! Orphan detection over a whole content store.
//!
//! [`OrphanDetector`] owns a reference map and answers queries against it:
//! one id's status, the orphan candidates among many ids, a summary report,
//! or everything known about one id. Every query takes `now` explicitly so
//! results are reproducible.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

use localhist_changelog::DecodedChangeLog;
use localhist_core::{ContentId, ContentReference, OrphanStatus};
use localhist_storage::ContentReader;

use crate::classifier::{
    classify, HIGH_CONFIDENCE, MEDIUM_CONFIDENCE, OLD_DAYS, RECENT_DAYS, VERY_OLD_DAYS,
};
use crate::config::AnalysisConfig;
use crate::indexer::{build_reference_map, sort_by_recency, ReferenceMap};

/// One id reported by [`OrphanDetector::find_orphaned`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanCandidate {
    /// Content id
    pub content_id: ContentId,
    /// Its verdict, `Orphaned` or `Uncertain`
    pub status: OrphanStatus,
}

/// Uncertain verdicts per confidence band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceBands {
    /// Confidence >= 0.9
    pub high: usize,
    /// 0.7 <= confidence < 0.9
    pub medium: usize,
    /// Confidence < 0.7
    pub low: usize,
}

impl ConfidenceBands {
    fn record(&mut self, confidence: f32) {
        if confidence >= HIGH_CONFIDENCE {
            self.high += 1;
        } else if confidence >= MEDIUM_CONFIDENCE {
            self.medium += 1;
        } else {
            self.low += 1;
        }
    }
}

/// Orphaned ids per age of their last reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgeBuckets {
    /// Under 7 days
    pub under_week: usize,
    /// 7 to 30 days
    pub weeks: usize,
    /// 30 to 90 days
    pub months: usize,
    /// 90 days or more
    pub over_three_months: usize,
    /// Last reference carries no timestamp
    pub undated: usize,
}

impl AgeBuckets {
    fn record(&mut self, days: Option<i64>) {
        match days {
            None => self.undated += 1,
            Some(d) if d < RECENT_DAYS => self.under_week += 1,
            Some(d) if d < OLD_DAYS => self.weeks += 1,
            Some(d) if d < VERY_OLD_DAYS => self.months += 1,
            Some(_) => self.over_three_months += 1,
        }
    }
}

/// Summary of the verdicts over a set of content ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanAnalysisReport {
    /// Ids examined
    pub total_content: usize,
    /// `Orphaned` verdicts
    pub orphaned_count: usize,
    /// `Active` verdicts
    pub active_count: usize,
    /// `Uncertain` verdicts
    pub uncertain_count: usize,
    /// Uncertain verdicts by confidence
    pub uncertain_by_confidence: ConfidenceBands,
    /// Orphaned verdicts by age of last reference
    pub orphaned_by_age: AgeBuckets,
    /// Distinct content ids referenced by the change log
    pub reference_map_size: usize,
}

impl OrphanAnalysisReport {
    fn percentage(&self, count: usize) -> f64 {
        if self.total_content == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total_content as f64
        }
    }

    /// Share of ids found orphaned, in percent
    pub fn orphan_percentage(&self) -> f64 {
        self.percentage(self.orphaned_count)
    }

    /// Share of ids found active, in percent
    pub fn active_percentage(&self) -> f64 {
        self.percentage(self.active_count)
    }

    /// Share of ids found uncertain, in percent
    pub fn uncertain_percentage(&self) -> f64 {
        self.percentage(self.uncertain_count)
    }
}

impl fmt::Display for OrphanAnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total content items: {}", self.total_content)?;
        writeln!(f, "Reference map entries: {}", self.reference_map_size)?;
        writeln!(
            f,
            "Active: {} ({:.1}%)",
            self.active_count,
            self.active_percentage()
        )?;
        writeln!(
            f,
            "Orphaned: {} ({:.1}%)",
            self.orphaned_count,
            self.orphan_percentage()
        )?;
        write!(
            f,
            "Uncertain: {} (high {}, medium {}, low {})",
            self.uncertain_count,
            self.uncertain_by_confidence.high,
            self.uncertain_by_confidence.medium,
            self.uncertain_by_confidence.low
        )
    }
}

/// Everything known about one content id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrphanDetails {
    /// Content id
    pub content_id: ContentId,
    /// Verdict
    pub status: OrphanStatus,
    /// References, most recent first
    pub references: Vec<ContentReference>,
    /// Decoded content length, when the record could be read
    pub content_size: Option<usize>,
    /// Stored hash in hex, when the record could be read
    pub content_hash: Option<String>,
    /// Whether the record was stored compressed, when it could be read
    pub is_compressed: Option<bool>,
    /// Path of the most recent reference that has one
    pub last_reference_path: Option<String>,
    /// Time of the most recent reference
    pub last_reference_time: Option<DateTime<Utc>>,
}

fn most_recent(references: &[ContentReference]) -> Option<&ContentReference> {
    references.iter().reduce(|best, r| {
        if r.timestamp_millis.unwrap_or(0) > best.timestamp_millis.unwrap_or(0) {
            r
        } else {
            best
        }
    })
}

/// Orphan queries over one reference map.
#[derive(Debug, Clone, Default)]
pub struct OrphanDetector {
    references: ReferenceMap,
}

impl OrphanDetector {
    /// Detector over an existing reference map
    pub fn new(references: ReferenceMap) -> Self {
        OrphanDetector { references }
    }

    /// Detector over every decoded change set of a change log
    pub fn from_change_log(log: &DecodedChangeLog) -> Self {
        Self::new(build_reference_map(log.iter_change_sets()))
    }

    /// The underlying reference map
    pub fn reference_map(&self) -> &ReferenceMap {
        &self.references
    }

    /// References to `content_id` in scan order
    pub fn references(&self, content_id: ContentId) -> &[ContentReference] {
        self.references
            .get(&content_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Classify one content id.
    pub fn status(&self, content_id: ContentId, now: DateTime<Utc>) -> OrphanStatus {
        classify(self.references(content_id), now)
    }

    /// Orphan candidates among `ids`.
    ///
    /// Keeps `Orphaned` verdicts and `Uncertain` ones with confidence of at
    /// least `min_confidence`. Orphaned sort first, then by confidence
    /// descending, then by id.
    pub fn find_orphaned<I>(
        &self,
        ids: I,
        min_confidence: f32,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Vec<OrphanCandidate>
    where
        I: IntoIterator<Item = ContentId>,
    {
        let mut candidates: Vec<_> = ids
            .into_iter()
            .filter_map(|content_id| {
                let status = self.status(content_id, now);
                let keep = match &status {
                    OrphanStatus::Orphaned => true,
                    OrphanStatus::Uncertain { confidence, .. } => *confidence >= min_confidence,
                    OrphanStatus::Active => false,
                };
                keep.then_some(OrphanCandidate { content_id, status })
            })
            .collect();

        candidates.sort_by(compare_candidates);
        if let Some(limit) = limit {
            candidates.truncate(limit);
        }
        candidates
    }

    /// [`Self::find_orphaned`] with the threshold and limit of `config`.
    pub fn find_orphaned_with<I>(
        &self,
        ids: I,
        config: &AnalysisConfig,
        now: DateTime<Utc>,
    ) -> Vec<OrphanCandidate>
    where
        I: IntoIterator<Item = ContentId>,
    {
        self.find_orphaned(ids, config.min_confidence, config.limit, now)
    }

    /// Summarize the verdicts for `ids`.
    pub fn analyze<I>(&self, ids: I, now: DateTime<Utc>) -> OrphanAnalysisReport
    where
        I: IntoIterator<Item = ContentId>,
    {
        let mut report = OrphanAnalysisReport {
            reference_map_size: self.references.len(),
            ..Default::default()
        };

        for content_id in ids {
            report.total_content += 1;
            match self.status(content_id, now) {
                OrphanStatus::Active => report.active_count += 1,
                OrphanStatus::Orphaned => {
                    report.orphaned_count += 1;
                    let days = most_recent(self.references(content_id))
                        .and_then(ContentReference::timestamp)
                        .map(|t| (now - t).num_days());
                    report.orphaned_by_age.record(days);
                }
                OrphanStatus::Uncertain { confidence, .. } => {
                    report.uncertain_count += 1;
                    report.uncertain_by_confidence.record(confidence);
                }
            }
        }

        debug!(
            total = report.total_content,
            orphaned = report.orphaned_count,
            active = report.active_count,
            uncertain = report.uncertain_count,
            "Analyzed orphan patterns"
        );
        report
    }

    /// Verdict, references and stored record facts for one id.
    ///
    /// `reader` is optional; without it the content fields stay empty.
    pub fn details<R>(
        &self,
        content_id: ContentId,
        reader: Option<&R>,
        now: DateTime<Utc>,
    ) -> OrphanDetails
    where
        R: ContentReader + ?Sized,
    {
        let mut references = self.references(content_id).to_vec();
        let status = classify(&references, now);
        let last_reference_time = most_recent(&references).and_then(ContentReference::timestamp);
        sort_by_recency(&mut references);

        let record = reader.and_then(|r| r.read_content(content_id));
        let last_reference_path = references.iter().find_map(|r| r.path.clone());

        OrphanDetails {
            content_id,
            status,
            content_size: record.as_ref().map(|r| r.content.len()),
            content_hash: record.as_ref().map(|r| r.crypto_hash_hex()),
            is_compressed: record.as_ref().map(|r| r.is_compressed),
            last_reference_path,
            last_reference_time,
            references,
        }
    }
}

fn compare_candidates(a: &OrphanCandidate, b: &OrphanCandidate) -> Ordering {
    let rank = |c: &OrphanCandidate| match c.status {
        OrphanStatus::Orphaned => 0,
        _ => 1,
    };
    let confidence = |c: &OrphanCandidate| c.status.confidence().unwrap_or(0.0);

    rank(a)
        .cmp(&rank(b))
        .then_with(|| confidence(b).total_cmp(&confidence(a)))
        .then_with(|| a.content_id.cmp(&b.content_id))
}
