//! Change-set blob decoding.
//!
//! One blob, in [`crate::varint`] encoding:
//!
//! ```text
//! version        varint
//! id             varlong
//! name           optional string
//! timestamp      varlong (millis)
//! kind           optional string    (version >= 1, discarded)
//! provider       optional string    (version >= 1, discarded)
//! change_count   varint
//! changes        change_count x change
//!
//! change:
//!   kind         varint (1..=9)
//!   change_id    varlong            (kinds 1..=7, discarded)
//!   path         string             (kinds 1..=7)
//!   content_id   varint             (kind 3)
//!   old_stamp    varlong            (kind 3, discarded)
//! ```
//!
//! A blob whose header does not decode yields no change set. A change that
//! does not decode ends its set: the changes before it are kept.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use localhist_core::{Change, ChangeKind, ChangeRecord, ChangeSet};

use crate::error::{ChangeLogError, ChangeLogResult, VarIntError};
use crate::index::{parse_index_file, ChangeLogHeader};
use crate::paths::ChangeLogPaths;
use crate::varint::VarIntReader;

struct SetHeader {
    id: i64,
    name: Option<String>,
    timestamp_millis: i64,
    change_count: i32,
}

fn read_set_header(r: &mut VarIntReader<'_>) -> Result<SetHeader, VarIntError> {
    let version = r.read_varint()?;
    let id = r.read_varlong()?;
    let name = r.read_optional_string()?;
    let timestamp_millis = r.read_varlong()?;
    if version >= 1 {
        r.read_optional_string()?;
        r.read_optional_string()?;
    }
    let change_count = r.read_varint()?;
    Ok(SetHeader {
        id,
        name,
        timestamp_millis,
        change_count,
    })
}

fn read_change(r: &mut VarIntReader<'_>) -> Result<Change, VarIntError> {
    let kind = ChangeKind::from_code(r.read_varint()?);
    let mut change = Change {
        kind,
        path: None,
        content_id: None,
    };

    if kind.is_structural() {
        r.read_varlong()?;
        change.path = Some(r.read_string()?);
        if kind == ChangeKind::ContentChange {
            change.content_id = Some(r.read_varint()?);
            r.read_varlong()?;
        }
    }

    Ok(change)
}

/// Decode one change-set blob.
///
/// Returns `None` when the set header is malformed. A negative change count
/// decodes to a set with no changes.
pub fn decode_change_set(blob: &[u8]) -> Option<ChangeSet> {
    let mut r = VarIntReader::new(blob);

    let header = match read_set_header(&mut r) {
        Ok(header) => header,
        Err(e) => {
            debug!(error = %e, "Change-set header did not decode");
            return None;
        }
    };
    if header.change_count < 0 {
        debug!(set_id = header.id, change_count = header.change_count, "Negative change count");
    }

    let mut changes = Vec::with_capacity((header.change_count.max(0) as usize).min(blob.len()));
    for index in 0..header.change_count {
        match read_change(&mut r) {
            Ok(change) => changes.push(change),
            Err(e) => {
                debug!(
                    set_id = header.id,
                    index,
                    declared = header.change_count,
                    error = %e,
                    "Change did not decode, dropping rest of set"
                );
                break;
            }
        }
    }

    Some(ChangeSet {
        id: header.id,
        name: header.name,
        timestamp_millis: header.timestamp_millis,
        changes,
    })
}

/// A decoded change log.
#[derive(Debug, Clone)]
pub struct DecodedChangeLog {
    /// Index header
    pub header: ChangeLogHeader,
    /// Live index slots in slot order
    pub records: Vec<ChangeRecord>,
    /// Decoded blob per live record id; `None` when the blob is out of
    /// bounds or did not decode
    pub change_sets: BTreeMap<i32, Option<ChangeSet>>,
}

impl DecodedChangeLog {
    /// Successfully decoded change sets in record id order.
    pub fn iter_change_sets(&self) -> impl Iterator<Item = &ChangeSet> {
        self.change_sets.values().flatten()
    }

    /// Number of live records whose blob did not decode.
    pub fn failed_count(&self) -> usize {
        self.change_sets.values().filter(|s| s.is_none()).count()
    }
}

fn blob_of<'d>(data: &'d [u8], record: &ChangeRecord) -> Option<&'d [u8]> {
    if record.address <= 0 || record.size <= 0 {
        return None;
    }
    let start = usize::try_from(record.address).ok()?;
    let end = start.checked_add(record.size as usize)?;
    data.get(start..end)
}

/// Decode a change log from its index and data files.
///
/// Fails only when a file is missing or unreadable or the index header is
/// truncated. Every live record gets an entry in `change_sets`.
pub fn decode_change_log(index_path: &Path, data_path: &Path) -> ChangeLogResult<DecodedChangeLog> {
    let (header, records) = parse_index_file(index_path)?;
    let data = std::fs::read(data_path)
        .map_err(|e| ChangeLogError::from_io("change-log data", data_path.to_path_buf(), e))?;

    let mut change_sets = BTreeMap::new();
    for record in &records {
        let set = match blob_of(&data, record) {
            Some(blob) => {
                let set = decode_change_set(blob);
                if set.is_none() {
                    warn!(record_id = record.id, size = record.size, "Change set failed to decode");
                }
                set
            }
            None => {
                debug!(
                    record_id = record.id,
                    address = record.address,
                    size = record.size,
                    data_len = data.len(),
                    "Change-log record points outside data file"
                );
                None
            }
        };
        change_sets.insert(record.id, set);
    }

    debug!(
        index = %index_path.display(),
        records = records.len(),
        decoded = change_sets.values().filter(|s| s.is_some()).count(),
        "Decoded change log"
    );

    Ok(DecodedChangeLog {
        header,
        records,
        change_sets,
    })
}

/// Decode the change log inside a LocalHistory directory.
pub fn decode_change_log_dir(dir: &Path) -> ChangeLogResult<DecodedChangeLog> {
    let paths = ChangeLogPaths::from_root(dir);
    decode_change_log(&paths.index(), &paths.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ChangeSetBuilder;
    use crate::varint::VarIntWriter;

    #[test]
    fn test_full_change_set() {
        let blob = ChangeSetBuilder::new(42, 1_000)
            .name("Refactor")
            .create_file("/p/a.rs")
            .content_change("/p/a.rs", 7, 900)
            .rename("/p/b.rs")
            .delete("/p/c.rs")
            .label()
            .to_bytes();

        let set = decode_change_set(&blob).unwrap();
        assert_eq!(set.id, 42);
        assert_eq!(set.name.as_deref(), Some("Refactor"));
        assert_eq!(set.timestamp_millis, 1_000);
        assert_eq!(set.changes.len(), 5);

        assert_eq!(set.changes[1].kind, ChangeKind::ContentChange);
        assert_eq!(set.changes[1].content_id, Some(7));
        assert_eq!(set.changes[1].path.as_deref(), Some("/p/a.rs"));
        assert_eq!(set.changes[3].kind, ChangeKind::Delete);
        assert_eq!(set.changes[3].content_id, None);
        assert_eq!(set.changes[4].kind, ChangeKind::PutLabel);
        assert_eq!(set.changes[4].path, None);
    }

    #[test]
    fn test_version_zero_has_no_activity_fields() {
        let blob = ChangeSetBuilder::new(1, 5)
            .version(0)
            .content_change("/x", 3, 0)
            .to_bytes();
        let set = decode_change_set(&blob).unwrap();
        assert_eq!(set.changes[0].content_id, Some(3));
    }

    #[test]
    fn test_activity_fields_are_skipped() {
        let blob = ChangeSetBuilder::new(1, 5)
            .activity(Some("Refactoring"), Some("kotlin"))
            .content_change("/x", 3, 0)
            .to_bytes();
        let set = decode_change_set(&blob).unwrap();
        assert_eq!(set.name, None);
        assert_eq!(set.changes[0].content_id, Some(3));
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let blob = ChangeSetBuilder::new(1, 5).raw_kind(12).to_bytes();
        let set = decode_change_set(&blob).unwrap();
        assert_eq!(set.changes[0].kind, ChangeKind::Unknown(12));
    }

    #[test]
    fn test_truncated_change_keeps_earlier_changes() {
        let mut blob = ChangeSetBuilder::new(9, 5)
            .content_change("/a", 1, 0)
            .content_change("/b", 2, 0)
            .to_bytes();
        blob.truncate(blob.len() - 3);

        let set = decode_change_set(&blob).unwrap();
        assert_eq!(set.id, 9);
        assert_eq!(set.changes.len(), 1);
        assert_eq!(set.changes[0].content_id, Some(1));
    }

    #[test]
    fn test_overstated_count_keeps_decoded_changes() {
        let mut w = VarIntWriter::new();
        w.write_varint(1)
            .write_varint(3)
            .write_optional_string(None)
            .write_varint(10)
            .write_optional_string(None)
            .write_optional_string(None)
            .write_varint(4)
            .write_varint(7)
            .write_varint(0)
            .write_string("/gone");

        let set = decode_change_set(w.as_bytes()).unwrap();
        assert_eq!(set.changes.len(), 1);
        assert_eq!(set.changes[0].kind, ChangeKind::Delete);
    }

    #[test]
    fn test_truncated_header_yields_nothing() {
        let blob = ChangeSetBuilder::new(1, 5).name("n").to_bytes();
        assert!(decode_change_set(&blob[..3]).is_none());
        assert!(decode_change_set(&[]).is_none());
    }

    #[test]
    fn test_negative_count_yields_empty_set() {
        let mut w = VarIntWriter::new();
        w.write_varint(0)
            .write_varint(1)
            .write_optional_string(Some("n"))
            .write_varint(5)
            .write_varint(-1);

        let set = decode_change_set(w.as_bytes()).unwrap();
        assert_eq!(set.id, 1);
        assert_eq!(set.name.as_deref(), Some("n"));
        assert_eq!(set.timestamp_millis, 5);
        assert!(set.changes.is_empty());
    }

    #[test]
    fn test_blob_bounds() {
        let data = [0u8; 10];
        let record = |address, size| ChangeRecord {
            id: 1,
            address,
            size,
            capacity: size,
            prev_id: 0,
            next_id: 0,
            timestamp_millis: 0,
        };
        assert_eq!(blob_of(&data, &record(2, 8)).map(<[u8]>::len), Some(8));
        assert!(blob_of(&data, &record(2, 9)).is_none());
        assert!(blob_of(&data, &record(0, 4)).is_none());
        assert!(blob_of(&data, &record(-4, 4)).is_none());
    }
}
