//! Path queries over a decoded change log.
//!
//! - [`search_paths`]: every change whose path contains a term
//! - [`recover_by_path`]: matching content changes resolved through a store
//! - [`analyze_deletions`]: delete activity in a recent window

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use localhist_changelog::DecodedChangeLog;
use localhist_core::{Change, ChangeKind, ChangeRecord, ChangeSet, ContentId, ContentRecord};
use localhist_storage::ContentReader;

/// Deletes sharing one timestamp at or above this count form a large event.
pub const LARGE_DELETION_MIN: usize = 5;

/// Directory name used for paths without a `/`.
pub const ROOT_DIRECTORY: &str = "<root>";

/// One change whose path matched a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathMatch<'a> {
    /// Index slot the change set was read from
    pub record: &'a ChangeRecord,
    /// Change set holding the change
    pub change_set: &'a ChangeSet,
    /// The matching change
    pub change: &'a Change,
}

fn matching_changes<'a>(
    log: &'a DecodedChangeLog,
    term: &str,
) -> impl Iterator<Item = PathMatch<'a>> + 'a {
    let needle = term.to_lowercase();
    log.records.iter().flat_map(move |record| {
        let needle = needle.clone();
        log.change_sets
            .get(&record.id)
            .and_then(Option::as_ref)
            .into_iter()
            .flat_map(move |set| {
                let needle = needle.clone();
                set.changes.iter().filter_map(move |change| {
                    let path = change.path.as_deref()?;
                    path.to_lowercase()
                        .contains(&needle)
                        .then_some(PathMatch {
                            record,
                            change_set: set,
                            change,
                        })
                })
            })
    })
}

fn most_recent_first(matches: &mut [PathMatch<'_>]) {
    matches.sort_by_key(|m| std::cmp::Reverse(m.record.timestamp_millis));
}

/// Changes whose path contains `term`, ignoring case.
///
/// Ordered by slot timestamp, most recent first; equal timestamps keep slot
/// order.
pub fn search_paths<'a>(log: &'a DecodedChangeLog, term: &str) -> Vec<PathMatch<'a>> {
    let mut matches: Vec<_> = matching_changes(log, term).collect();
    most_recent_first(&mut matches);
    debug!(term, matches = matches.len(), "Searched change-log paths");
    matches
}

/// A content change matched by path, with its stored content if any.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveredContent<'a> {
    /// The matching change
    #[serde(flatten)]
    pub matched: PathMatch<'a>,
    /// Content id the change points at
    pub content_id: ContentId,
    /// Stored record; `None` when the store no longer holds the id
    pub content: Option<ContentRecord>,
}

/// Content changes whose path contains `term`, resolved through `reader`.
///
/// Same matching and order as [`search_paths`], restricted to changes that
/// carry a content id.
pub fn recover_by_path<'a, R>(
    log: &'a DecodedChangeLog,
    term: &str,
    reader: &R,
) -> Vec<RecoveredContent<'a>>
where
    R: ContentReader + ?Sized,
{
    let mut matches: Vec<_> = matching_changes(log, term)
        .filter(|m| m.change.content_id.is_some())
        .collect();
    most_recent_first(&mut matches);

    let recovered: Vec<_> = matches
        .into_iter()
        .filter_map(|matched| {
            let content_id = matched.change.content_id?;
            Some(RecoveredContent {
                matched,
                content_id,
                content: reader.read_content(content_id),
            })
        })
        .collect();

    debug!(
        term,
        matches = recovered.len(),
        available = recovered.iter().filter(|r| r.content.is_some()).count(),
        "Recovered content by path"
    );
    recovered
}

/// One deleted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionEvent {
    /// Timestamp of the owning change set
    pub timestamp_millis: i64,
    /// Deleted path
    pub path: String,
    /// Content id, when the change carried one
    pub content_id: Option<ContentId>,
}

impl DeletionEvent {
    /// Timestamp as a UTC instant.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_millis).single()
    }

    /// Parent directory, or [`ROOT_DIRECTORY`] for a bare name.
    pub fn directory(&self) -> &str {
        self.path
            .rfind('/')
            .map_or(ROOT_DIRECTORY, |slash| &self.path[..slash])
    }
}

/// Deletes that share one change-set timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeDeletion {
    /// Shared timestamp
    pub timestamp_millis: i64,
    /// Deleted paths in scan order
    pub paths: Vec<String>,
}

/// Delete activity within a window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Window length in days
    pub days: i64,
    /// Deletes in the window, most recent first
    pub events: Vec<DeletionEvent>,
    /// Delete count per UTC date, newest date first when iterated in reverse
    pub by_date: BTreeMap<NaiveDate, usize>,
    /// Delete count per parent directory, largest first, then by name
    pub by_directory: Vec<(String, usize)>,
    /// Timestamps with at least [`LARGE_DELETION_MIN`] deletes, largest first
    pub large_events: Vec<LargeDeletion>,
}

impl DeletionReport {
    /// Number of deletes in the window
    pub fn total(&self) -> usize {
        self.events.len()
    }
}

/// Summarize Delete changes whose slot lies within `days` before `now`.
///
/// Only deletes that name a path are counted.
pub fn analyze_deletions(log: &DecodedChangeLog, days: i64, now: DateTime<Utc>) -> DeletionReport {
    let cutoff = (now - Duration::days(days)).timestamp_millis();

    let mut events = Vec::new();
    for record in &log.records {
        if record.timestamp_millis < cutoff {
            continue;
        }
        let Some(Some(set)) = log.change_sets.get(&record.id) else {
            continue;
        };
        for change in &set.changes {
            if change.kind != ChangeKind::Delete {
                continue;
            }
            let Some(path) = &change.path else { continue };
            events.push(DeletionEvent {
                timestamp_millis: set.timestamp_millis,
                path: path.clone(),
                content_id: change.content_id,
            });
        }
    }

    let mut by_date = BTreeMap::new();
    let mut directories: HashMap<&str, usize> = HashMap::new();
    let mut by_timestamp: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for event in &events {
        if let Some(time) = event.timestamp() {
            *by_date.entry(time.date_naive()).or_insert(0) += 1;
        }
        *directories.entry(event.directory()).or_insert(0) += 1;
        by_timestamp
            .entry(event.timestamp_millis)
            .or_default()
            .push(event.path.clone());
    }

    let mut by_directory: Vec<(String, usize)> = directories
        .into_iter()
        .map(|(dir, count)| (dir.to_string(), count))
        .collect();
    by_directory.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut large_events: Vec<LargeDeletion> = by_timestamp
        .into_iter()
        .filter(|(_, paths)| paths.len() >= LARGE_DELETION_MIN)
        .map(|(timestamp_millis, paths)| LargeDeletion {
            timestamp_millis,
            paths,
        })
        .collect();
    large_events.sort_by(|a, b| b.paths.len().cmp(&a.paths.len()));

    events.sort_by_key(|e| std::cmp::Reverse(e.timestamp_millis));

    debug!(
        days,
        deletions = events.len(),
        large_events = large_events.len(),
        "Analyzed deletions"
    );

    DeletionReport {
        days,
        events,
        by_date,
        by_directory,
        large_events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localhist_changelog::decode_change_log_dir;
    use localhist_changelog::testing::{ChangeLogBuilder, ChangeSetBuilder};
    use localhist_storage::testing::AolFileBuilder;
    use localhist_storage::AppendOnlyLogReader;
    use tempfile::TempDir;

    const DAY_MS: i32 = 86_400_000;

    fn epoch_day(n: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap() + Duration::days(n)
    }

    fn decode(sets: &[ChangeSetBuilder]) -> (TempDir, DecodedChangeLog) {
        let dir = TempDir::new().unwrap();
        sets.iter()
            .fold(ChangeLogBuilder::new(), |log, set| log.change_set(set))
            .write_to(dir.path())
            .unwrap();
        let log = decode_change_log_dir(dir.path()).unwrap();
        (dir, log)
    }

    #[test]
    fn test_search_ignores_case_and_sorts_recent_first() {
        let (_dir, log) = decode(&[
            ChangeSetBuilder::new(1, 100)
                .create_file("/src/Main.kt")
                .create_file("/src/util.kt"),
            ChangeSetBuilder::new(2, 300).content_change("/src/main.kt", 7, 100),
            ChangeSetBuilder::new(3, 200).label().rename("/docs/MAIN.md"),
        ]);

        let matches = search_paths(&log, "main");
        let found: Vec<_> = matches
            .iter()
            .map(|m| (m.change_set.id, m.change.path.as_deref().unwrap()))
            .collect();
        assert_eq!(
            found,
            vec![(2, "/src/main.kt"), (3, "/docs/MAIN.md"), (1, "/src/Main.kt")]
        );
        assert_eq!(matches[0].record.timestamp_millis, 300);
        assert!(search_paths(&log, "absent").is_empty());
    }

    #[test]
    fn test_search_skips_undecoded_sets() {
        let dir = TempDir::new().unwrap();
        ChangeLogBuilder::new()
            .blob(&[31, 0], 500)
            .change_set(&ChangeSetBuilder::new(2, 100).create_file("/a"))
            .write_to(dir.path())
            .unwrap();
        let log = decode_change_log_dir(dir.path()).unwrap();

        let matches = search_paths(&log, "/a");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].record.id, 2);
    }

    #[test]
    fn test_recover_resolves_content_changes_only() {
        let store_dir = TempDir::new().unwrap();
        let path = store_dir.path().join("content.dat");
        AolFileBuilder::new()
            .record(b"v1")
            .record(b"v2")
            .write_to(&path)
            .unwrap();
        let reader = AppendOnlyLogReader::open(&path).unwrap();
        let ids: Vec<_> = reader.list_content_ids().collect();

        let (_dir, log) = decode(&[
            ChangeSetBuilder::new(1, 100)
                .create_file("/notes.txt")
                .content_change("/notes.txt", ids[0], 0),
            ChangeSetBuilder::new(2, 200)
                .content_change("/Notes.txt", ids[1], 100)
                .content_change("/notes.txt", 9999, 100)
                .delete("/notes.txt"),
        ]);

        let recovered = recover_by_path(&log, "NOTES", &reader);
        let summary: Vec<_> = recovered
            .iter()
            .map(|r| (r.content_id, r.content.as_ref().map(|c| c.content.clone())))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ids[1], Some(b"v2".to_vec())),
                (9999, None),
                (ids[0], Some(b"v1".to_vec())),
            ]
        );
    }

    #[test]
    fn test_deletion_window_and_groups() {
        let mut burst = ChangeSetBuilder::new(3, 2 * DAY_MS);
        for i in 0..6 {
            burst = burst.delete(&format!("/proj/gen/file{i}.rs"));
        }
        let (_dir, log) = decode(&[
            ChangeSetBuilder::new(1, 0).delete("/proj/old.rs"),
            ChangeSetBuilder::new(2, DAY_MS)
                .delete("/proj/a.rs")
                .content_change("/proj/b.rs", 3, 0)
                .delete("top.txt"),
            burst,
        ]);

        let report = analyze_deletions(&log, 2, epoch_day(3));
        assert_eq!(report.days, 2);
        assert_eq!(report.total(), 8);
        assert_eq!(report.events[0].timestamp_millis, 2 * DAY_MS as i64);
        assert_eq!(report.events.last().unwrap().path, "top.txt");

        let dates: Vec<_> = report.by_date.iter().map(|(d, n)| (d.to_string(), *n)).collect();
        assert_eq!(
            dates,
            vec![("1970-01-02".to_string(), 2), ("1970-01-03".to_string(), 6)]
        );

        assert_eq!(
            report.by_directory,
            vec![
                ("/proj/gen".to_string(), 6),
                ("/proj".to_string(), 1),
                (ROOT_DIRECTORY.to_string(), 1),
            ]
        );

        assert_eq!(report.large_events.len(), 1);
        assert_eq!(report.large_events[0].paths.len(), 6);
        assert_eq!(report.large_events[0].paths[0], "/proj/gen/file0.rs");
    }

    #[test]
    fn test_no_deletions() {
        let (_dir, log) = decode(&[ChangeSetBuilder::new(1, 0).create_file("/a")]);
        let report = analyze_deletions(&log, 30, epoch_day(1));
        assert_eq!(report.total(), 0);
        assert!(report.by_date.is_empty());
        assert!(report.large_events.is_empty());
    }

    #[test]
    fn test_directory_of_path() {
        let event = |path: &str| DeletionEvent {
            timestamp_millis: 0,
            path: path.to_string(),
            content_id: None,
        };
        assert_eq!(event("/a/b.txt").directory(), "/a");
        assert_eq!(event("/b.txt").directory(), "");
        assert_eq!(event("b.txt").directory(), ROOT_DIRECTORY);
    }
}
