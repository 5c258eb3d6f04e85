//! Legacy paged store with a change log.

use crate::common::*;
use localhist::changelog::testing::ChangeSetBuilder;
use localhist::storage::testing::LegacyStoreBuilder;
use localhist::{
    decode_change_log_dir, open_store, ContentReader, IdeCacheLayout, OrphanDetector,
    OrphanStatus, StorageFormat,
};

#[test]
fn test_legacy_store_with_deletes() {
    init_tracing();
    let fx = IdeFixture::new("IntelliJIdea2023.2");
    fx.write_legacy_store(
        LegacyStoreBuilder::new()
            .record(b"alpha")
            .free_slot()
            .compressed_record(&b"beta ".repeat(50))
            .record(b"gamma"),
    );
    fx.write_change_log(&[
        ChangeSetBuilder::new(1, day_millis(1))
            .content_change("/a.txt", 1, 0)
            .content_change("/b.txt", 3, 0),
        ChangeSetBuilder::new(2, day_millis(2)).delete("/b.txt"),
        ChangeSetBuilder::new(3, day_millis(3)).content_change("/a.txt", 1, day_millis(1)),
    ]);

    let layout = IdeCacheLayout::discover(fx.root()).unwrap();
    let store = open_store(&layout.caches_dir()).unwrap();
    assert_eq!(store.format(), StorageFormat::LegacyPaged);
    assert_eq!(store.list_content_ids().collect::<Vec<_>>(), vec![1, 3, 4]);
    assert_eq!(store.read_content(3).unwrap().content, b"beta ".repeat(50));

    let log = decode_change_log_dir(&layout.local_history_dir()).unwrap();
    let detector = OrphanDetector::from_change_log(&log);

    let now = day(4);
    assert_eq!(detector.status(1, now), OrphanStatus::Active);
    // the delete names a path, not a content id, so id 3 keeps one reference
    assert_eq!(detector.references(3).len(), 1);
    assert_eq!(detector.status(3, now), OrphanStatus::Active);
    assert_eq!(detector.status(4, now).confidence(), Some(0.9));

    let report = detector.analyze(store.list_content_ids(), now);
    assert_eq!(report.total_content, 3);
    assert_eq!(report.reference_map_size, 2);
    store.close();
}
