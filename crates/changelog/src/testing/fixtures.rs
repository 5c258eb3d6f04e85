//! Change-log builders

use byteorder::{BigEndian, WriteBytesExt};
use std::io;
use std::path::{Path, PathBuf};

use localhist_core::ChangeKind;

use crate::paths::ChangeLogPaths;
use crate::varint::VarIntWriter;

/// Encodes one change-set blob.
#[derive(Debug, Clone)]
pub struct ChangeSetBuilder {
    version: i32,
    id: i32,
    name: Option<String>,
    timestamp_millis: i32,
    activity: (Option<String>, Option<String>),
    changes: Vec<Vec<u8>>,
    next_change_id: i32,
}

impl ChangeSetBuilder {
    /// Version-1 set with the given id and timestamp.
    pub fn new(id: i32, timestamp_millis: i32) -> Self {
        ChangeSetBuilder {
            version: 1,
            id,
            name: None,
            timestamp_millis,
            activity: (None, None),
            changes: Vec::new(),
            next_change_id: 1,
        }
    }

    /// Blob version; below 1 omits the activity fields.
    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Set label
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Activity kind and provider, written for version >= 1.
    pub fn activity(mut self, kind: Option<&str>, provider: Option<&str>) -> Self {
        self.activity = (kind.map(str::to_string), provider.map(str::to_string));
        self
    }

    /// Slot timestamp to use for this set
    pub fn timestamp_millis(&self) -> i32 {
        self.timestamp_millis
    }

    fn structural(mut self, kind: ChangeKind, path: &str, content: Option<(i32, i32)>) -> Self {
        let mut w = VarIntWriter::new();
        w.write_varint(kind.code())
            .write_varint(self.next_change_id)
            .write_string(path);
        if let Some((content_id, old_timestamp)) = content {
            w.write_varint(content_id).write_varint(old_timestamp);
        }
        self.next_change_id += 1;
        self.changes.push(w.into_bytes());
        self
    }

    /// CreateFile change
    pub fn create_file(self, path: &str) -> Self {
        self.structural(ChangeKind::CreateFile, path, None)
    }

    /// CreateDirectory change
    pub fn create_directory(self, path: &str) -> Self {
        self.structural(ChangeKind::CreateDirectory, path, None)
    }

    /// ContentChange change
    pub fn content_change(self, path: &str, content_id: i32, old_timestamp: i32) -> Self {
        self.structural(
            ChangeKind::ContentChange,
            path,
            Some((content_id, old_timestamp)),
        )
    }

    /// Rename change
    pub fn rename(self, path: &str) -> Self {
        self.structural(ChangeKind::Rename, path, None)
    }

    /// Move change
    pub fn move_to(self, path: &str) -> Self {
        self.structural(ChangeKind::Move, path, None)
    }

    /// Delete change
    pub fn delete(self, path: &str) -> Self {
        self.structural(ChangeKind::Delete, path, None)
    }

    /// PutLabel change
    pub fn label(self) -> Self {
        self.raw_kind(ChangeKind::PutLabel.code())
    }

    /// PutSystemLabel change
    pub fn system_label(self) -> Self {
        self.raw_kind(ChangeKind::PutSystemLabel.code())
    }

    /// A change consisting of only its kind code
    pub fn raw_kind(mut self, code: i32) -> Self {
        let mut w = VarIntWriter::new();
        w.write_varint(code);
        self.changes.push(w.into_bytes());
        self
    }

    /// Encoded blob
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = VarIntWriter::new();
        w.write_varint(self.version)
            .write_varint(self.id)
            .write_optional_string(self.name.as_deref())
            .write_varint(self.timestamp_millis);
        if self.version >= 1 {
            w.write_optional_string(self.activity.0.as_deref())
                .write_optional_string(self.activity.1.as_deref());
        }
        w.write_varint(self.changes.len() as i32);
        for change in &self.changes {
            w.write_raw(change);
        }
        w.into_bytes()
    }
}

/// Lays out a change-log index and data file.
#[derive(Debug, Clone)]
pub struct ChangeLogBuilder {
    version: u32,
    slots: Vec<(i64, i32, i64)>,
    data: Vec<u8>,
}

impl Default for ChangeLogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeLogBuilder {
    /// Empty log.
    ///
    /// The data file starts with a reserved word so no blob sits at
    /// address 0.
    pub fn new() -> Self {
        ChangeLogBuilder {
            version: 1,
            slots: Vec::new(),
            data: vec![0u8; 4],
        }
    }

    /// Append a slot for an encoded change set.
    pub fn change_set(self, set: &ChangeSetBuilder) -> Self {
        let timestamp = set.timestamp_millis() as i64;
        self.blob(&set.to_bytes(), timestamp)
    }

    /// Append a slot for arbitrary blob bytes.
    pub fn blob(mut self, bytes: &[u8], timestamp_millis: i64) -> Self {
        let address = self.data.len() as i64;
        self.data.extend_from_slice(bytes);
        self.slots
            .push((address, bytes.len() as i32, timestamp_millis));
        self
    }

    /// Append a free slot.
    pub fn free_slot(self) -> Self {
        self.slot(0, 0, 0)
    }

    /// Append a slot with arbitrary address and size.
    pub fn slot(mut self, address: i64, size: i32, timestamp_millis: i64) -> Self {
        self.slots.push((address, size, timestamp_millis));
        self
    }

    /// Write both files into `dir`, returning `(index, data)` paths.
    pub fn write_to(&self, dir: &Path) -> io::Result<(PathBuf, PathBuf)> {
        let paths = ChangeLogPaths::from_root(dir);
        let count = self.slots.len() as i32;

        let mut index = Vec::with_capacity(32 + self.slots.len() * 32);
        index.write_u32::<BigEndian>(0)?;
        index.write_u32::<BigEndian>(self.version)?;
        index.write_i64::<BigEndian>(count as i64)?;
        index.write_i32::<BigEndian>(if count > 0 { 1 } else { 0 })?;
        index.write_i32::<BigEndian>(count)?;
        index.write_i64::<BigEndian>(0)?;

        for (i, &(address, size, timestamp)) in self.slots.iter().enumerate() {
            let id = i as i32 + 1;
            index.write_i64::<BigEndian>(address)?;
            index.write_i32::<BigEndian>(size)?;
            index.write_i32::<BigEndian>(size)?;
            index.write_i32::<BigEndian>(id - 1)?;
            index.write_i32::<BigEndian>(if id < count { id + 1 } else { 0 })?;
            index.write_i64::<BigEndian>(timestamp)?;
        }

        std::fs::write(paths.index(), &index)?;
        std::fs::write(paths.data(), &self.data)?;
        Ok((paths.index(), paths.data()))
    }
}
