//! Append-only-log store with a change log, from cache discovery to report.

use crate::common::*;
use localhist::changelog::testing::ChangeSetBuilder;
use localhist::storage::testing::AolFileBuilder;
use localhist::{
    decode_change_log_dir, detect_format, open_store, AnalysisConfig, ContentReader,
    ContentScanner, IdeCacheLayout, OrphanDetector, OrphanStatus, ScanConfig, StorageFormat,
};

/// Ids of an append-only log are offset-derived; compute them the same way.
fn log_fixture() -> (IdeFixture, Vec<i32>) {
    let fx = IdeFixture::new("IntelliJIdea2025.1");
    fx.write_log_store(
        AolFileBuilder::new()
            .record(b"fn main() {}\n")
            .compressed_record(&b"// generated\n".repeat(40))
            .padding(16)
            .record(b"old notes")
            .record(b"removed"),
    );

    let store = open_store(&fx.caches()).unwrap();
    let ids: Vec<i32> = store.list_content_ids().collect();
    assert_eq!(ids.len(), 4);

    fx.write_change_log(&[
        ChangeSetBuilder::new(1, day_millis(-20))
            .create_file("/src/notes.txt")
            .content_change("/src/notes.txt", ids[2], 0)
            .content_change("/src/tmp.rs", ids[3], 0),
        ChangeSetBuilder::new(2, day_millis(20))
            .name("Edit main")
            .content_change("/src/main.rs", ids[0], day_millis(19))
            .content_change("/src/gen.rs", ids[1], 0),
    ]);
    (fx, ids)
}

#[test]
fn test_discovery_and_detection() {
    init_tracing();
    let (fx, _) = log_fixture();

    let layout = IdeCacheLayout::discover(fx.root()).unwrap();
    let config = AnalysisConfig::from_layout(&layout).with_limit(10);
    config.validate().unwrap();

    assert_eq!(config.store_dir, fx.caches());
    assert_eq!(
        detect_format(&config.store_dir),
        Some(StorageFormat::AppendOnlyLog)
    );
}

#[test]
fn test_compressed_record_through_facade() {
    init_tracing();
    let (fx, ids) = log_fixture();
    let store = open_store(&fx.caches()).unwrap();

    let record = store.read_content(ids[1]).unwrap();
    assert!(record.is_compressed);
    assert_eq!(record.content, b"// generated\n".repeat(40));
    assert!(record.is_text());
}

#[test]
fn test_orphan_candidates() {
    init_tracing();
    let (fx, ids) = log_fixture();
    let config = AnalysisConfig::from_layout(&IdeCacheLayout::discover(fx.root()).unwrap());

    let log = decode_change_log_dir(&config.change_log_dir).unwrap();
    let detector = OrphanDetector::from_change_log(&log);
    let store = open_store(&config.store_dir).unwrap();

    // the day-20 edits are recent, the day -20 ones are 42 days old
    let now = day(22);
    assert_eq!(detector.status(ids[0], now), OrphanStatus::Active);
    assert_eq!(detector.status(ids[1], now), OrphanStatus::Active);

    let found = detector.find_orphaned_with(store.list_content_ids(), &config, now);
    let found_ids: Vec<_> = found.iter().map(|c| c.content_id).collect();
    assert_eq!(found_ids, vec![ids[2], ids[3]]);
    for candidate in &found {
        assert_eq!(candidate.status.confidence(), Some(0.7));
        assert!(candidate.status.to_string().contains("42 days"));
    }

    let report = detector.analyze(store.list_content_ids(), now);
    assert_eq!(report.active_count, 2);
    assert_eq!(report.uncertain_by_confidence.medium, 2);
    assert_eq!(report.active_percentage(), 50.0);
}

#[test]
fn test_scan_then_inspect() {
    init_tracing();
    let (fx, ids) = log_fixture();
    let store = open_store(&fx.caches()).unwrap();
    let detector = OrphanDetector::from_change_log(&decode_change_log_dir(&fx.local_history()).unwrap());

    let hits: Vec<_> = ContentScanner::new(&store)
        .scan_containing("main", &ScanConfig::default().with_text_only(true))
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.content_id, ids[0]);

    let details = detector.details(ids[0], Some(&store), day(21));
    assert_eq!(details.last_reference_path.as_deref(), Some("/src/main.rs"));
    assert_eq!(details.content_size, Some(b"fn main() {}\n".len()));

    let json = serde_json::to_value(&details).unwrap();
    assert_eq!(json["status"]["status"], "active");
}

#[test]
fn test_recover_by_path_through_facade() {
    init_tracing();
    let (fx, ids) = log_fixture();
    let store = open_store(&fx.caches()).unwrap();
    let log = decode_change_log_dir(&fx.local_history()).unwrap();

    let recovered = localhist::recover_by_path(&log, "NOTES", &store);
    assert_eq!(recovered.len(), 1);
    assert_eq!(recovered[0].content_id, ids[2]);
    assert_eq!(
        recovered[0].content.as_ref().map(|r| r.content.as_slice()),
        Some(&b"old notes"[..])
    );

    // the create and the content change both name the file
    assert_eq!(localhist::search_paths(&log, "notes.txt").len(), 2);
}
