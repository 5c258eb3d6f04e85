//! Content store integration tests
//!
//! These tests build byte-exact store files and read them back through the
//! public API:
//! - Append-only-log records, plain and LZ4-compressed
//! - Legacy slot/heap pairs, including free slots
//! - Format detection and the `ContentStore` handle
//! - Scanning across a whole store

use localhist_storage::testing::{AolFileBuilder, LegacyStoreBuilder};
use localhist_storage::{
    detect_format, open_store, AppendOnlyLogReader, ContentReader, ContentScanner,
    LegacyPagedReader, ScanConfig,
};
use localhist_core::StorageFormat;
use tempfile::TempDir;

fn hash(seed: u8) -> [u8; 20] {
    let mut h = [0u8; 20];
    for (i, b) in h.iter_mut().enumerate() {
        *b = seed.wrapping_add(i as u8);
    }
    h
}

#[test]
fn test_hello_is_record_one() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.dat");
    AolFileBuilder::new()
        .record_with_hash(hash(0xA0), b"hello")
        .raw_field(0)
        .write_to(&path)
        .unwrap();

    let reader = AppendOnlyLogReader::open(&path).unwrap();
    assert_eq!(reader.list_content_ids().collect::<Vec<_>>(), vec![1]);

    let record = reader.read_content(1).unwrap();
    assert_eq!(record.content_id, 1);
    assert_eq!(record.content, b"hello");
    assert_eq!(record.uncompressed_size, 5);
    assert!(!record.is_compressed);
    assert_eq!(record.crypto_hash, hash(0xA0));
    assert!(record.crypto_hash_hex().starts_with("a0a1a2"));
}

#[test]
fn test_lz4_record_decompresses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.dat");
    let text = b"hello hello hello hello hello hello hello".repeat(8);
    AolFileBuilder::new()
        .compressed_record(&text)
        .write_to(&path)
        .unwrap();

    let reader = AppendOnlyLogReader::open(&path).unwrap();
    let record = reader.read_content(1).unwrap();
    assert!(record.is_compressed);
    assert_eq!(record.uncompressed_size as usize, text.len());
    assert_eq!(record.content, text);
}

#[test]
fn test_second_record_id_follows_first() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.dat");
    let builder = AolFileBuilder::new().record(b"first");
    let second_offset = builder.next_offset();
    builder.record(b"second").write_to(&path).unwrap();

    let reader = AppendOnlyLogReader::open(&path).unwrap();
    let expected = localhist_storage::offset_to_record_id(second_offset as i64);
    assert_eq!(reader.list_content_ids().collect::<Vec<_>>(), vec![1, expected]);
    assert_eq!(reader.read_content(expected).unwrap().content, b"second");
}

#[test]
fn test_zero_length_field_is_append_point() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.dat");
    AolFileBuilder::new()
        .record(b"kept")
        .raw_field(0)
        .raw_bytes(&[0xFF; 64])
        .write_to(&path)
        .unwrap();

    let reader = AppendOnlyLogReader::open(&path).unwrap();
    assert_eq!(reader.list_content_ids().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_oversized_length_field_stops_scan() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.dat");
    AolFileBuilder::new()
        .record(b"kept")
        .raw_field(200_000_000)
        .raw_bytes(&[0u8; 32])
        .write_to(&path)
        .unwrap();

    let reader = AppendOnlyLogReader::open(&path).unwrap();
    assert_eq!(reader.list_content_ids().collect::<Vec<_>>(), vec![1]);
    assert_eq!(reader.record_count(), 1);
}

#[test]
fn test_undersized_record_is_listed_nowhere() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.dat");
    // 4-byte length + 8 bytes: too small for hash and size field
    AolFileBuilder::new()
        .raw_field(12)
        .raw_bytes(&[0u8; 8])
        .record(b"real")
        .write_to(&path)
        .unwrap();

    let reader = AppendOnlyLogReader::open(&path).unwrap();
    assert!(reader.read_content(1).is_none());
    let ids: Vec<_> = reader.list_content_ids().collect();
    assert_eq!(ids, vec![4]);
    assert_eq!(reader.read_content(4).unwrap().content, b"real");
}

#[test]
fn test_id_inside_record_is_not_a_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("content.dat");
    AolFileBuilder::new()
        .record(b"some content here")
        .write_to(&path)
        .unwrap();

    let reader = AppendOnlyLogReader::open(&path).unwrap();
    // id 2 lands on the hash bytes of record 1, which read as length 0
    assert!(reader.read_content(2).is_none());
    assert!(reader.read_content(1_000_000).is_none());
}

#[test]
fn test_legacy_free_slots_are_excluded() {
    let dir = TempDir::new().unwrap();
    let (index, data) = LegacyStoreBuilder::new()
        .record(b"one")
        .slot(0, 40, 40)
        .slot(16, 0, 0)
        .record(b"four")
        .write_to(dir.path())
        .unwrap();

    let reader = LegacyPagedReader::open(&index, &data).unwrap();
    assert_eq!(reader.record_count(), 4);
    assert_eq!(reader.list_content_ids().collect::<Vec<_>>(), vec![1, 4]);
    assert!(reader.read_content(2).is_none());
    assert!(reader.read_content(3).is_none());
    assert_eq!(reader.read_content(4).unwrap().content, b"four");
}

#[test]
fn test_legacy_slot_past_data_end() {
    let dir = TempDir::new().unwrap();
    let (index, data) = LegacyStoreBuilder::new()
        .record(b"one")
        .slot(16, 10_000, 10_000)
        .write_to(dir.path())
        .unwrap();

    let reader = LegacyPagedReader::open(&index, &data).unwrap();
    assert!(reader.read_content(2).is_none());
    assert_eq!(reader.list_content_ids().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn test_legacy_compressed_record() {
    let dir = TempDir::new().unwrap();
    let text = b"legacy legacy legacy legacy".repeat(4);
    let (index, data) = LegacyStoreBuilder::new()
        .compressed_record(&text)
        .write_to(dir.path())
        .unwrap();

    let reader = LegacyPagedReader::open(&index, &data).unwrap();
    let record = reader.read_content(1).unwrap();
    assert!(record.is_compressed);
    assert_eq!(record.content, text);
}

#[test]
fn test_unclean_legacy_store_still_opens() {
    let dir = TempDir::new().unwrap();
    let (index, data) = LegacyStoreBuilder::new()
        .magic(0)
        .record(b"x")
        .write_to(dir.path())
        .unwrap();

    let reader = LegacyPagedReader::open(&index, &data).unwrap();
    assert_eq!(reader.magic(), 0);
    assert_eq!(reader.read_content(1).unwrap().content, b"x");
}

#[test]
fn test_append_only_log_wins_detection() {
    let dir = TempDir::new().unwrap();
    LegacyStoreBuilder::new()
        .record(b"old")
        .write_to(dir.path())
        .unwrap();
    AolFileBuilder::new()
        .record(b"new")
        .write_to(&dir.path().join("content.dat"))
        .unwrap();

    assert_eq!(detect_format(dir.path()), Some(StorageFormat::AppendOnlyLog));
    let store = open_store(dir.path()).unwrap();
    assert_eq!(store.read_content(1).unwrap().content, b"new");
}

#[test]
fn test_scan_whole_legacy_store() {
    let dir = TempDir::new().unwrap();
    LegacyStoreBuilder::new()
        .record(b"first line\nsecond line")
        .free_slot()
        .record(&[0u8, 159, 146, 150, 0, 1])
        .write_to(dir.path())
        .unwrap();

    let store = open_store(dir.path()).unwrap();
    let results: Vec<_> = ContentScanner::new(&store)
        .scan(&ScanConfig::default())
        .collect();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].metadata.content_id, 1);
    assert_eq!(
        results[0].preview.as_deref(),
        Some("first line\nsecond line")
    );
    assert_eq!(results[1].metadata.content_id, 3);
    assert!(!results[1].metadata.is_text);
}
