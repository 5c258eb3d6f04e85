//! Store file builders

use byteorder::{BigEndian, WriteBytesExt};
use std::fs::OpenOptions;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use localhist_core::limits::{
    AOL_HEADER_SIZE, AOL_MAGIC, AOL_PADDING_FLAG, CONTENT_HASH_LEN, LEGACY_SAFELY_CLOSED_MAGIC,
};

use crate::paths::{LEGACY_DATA_FILE, LEGACY_INDEX_FILE};

/// Builds an append-only-log file record by record.
///
/// Every record is padded with zeros to the next 4-byte boundary, matching
/// how the IDE lays out the log.
#[derive(Debug, Clone)]
pub struct AolFileBuilder {
    bytes: Vec<u8>,
}

impl Default for AolFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AolFileBuilder {
    /// Start a log with a version-1 header.
    pub fn new() -> Self {
        Self::with_version(1)
    }

    /// Start a log with the given header version.
    pub fn with_version(version: u32) -> Self {
        let mut bytes = vec![0u8; AOL_HEADER_SIZE as usize];
        bytes[0..4].copy_from_slice(&AOL_MAGIC.to_le_bytes());
        bytes[4..8].copy_from_slice(&version.to_le_bytes());
        AolFileBuilder { bytes }
    }

    /// Offset the next record will start at.
    pub fn next_offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Append an uncompressed record with a zero hash.
    pub fn record(self, content: &[u8]) -> Self {
        self.record_with_hash([0u8; CONTENT_HASH_LEN], content)
    }

    /// Append an uncompressed record with the given hash.
    pub fn record_with_hash(self, hash: [u8; CONTENT_HASH_LEN], content: &[u8]) -> Self {
        self.raw_record(hash, content.len() as i32, content)
    }

    /// Append an LZ4-compressed record with a zero hash.
    pub fn compressed_record(self, content: &[u8]) -> Self {
        let compressed = lz4_flex::block::compress(content);
        self.raw_record([0u8; CONTENT_HASH_LEN], -(content.len() as i32), &compressed)
    }

    /// Append a record with an explicit size field and stored bytes.
    pub fn raw_record(mut self, hash: [u8; CONTENT_HASH_LEN], size: i32, stored: &[u8]) -> Self {
        let length = 4 + CONTENT_HASH_LEN + 4 + stored.len();
        self.bytes.extend_from_slice(&(length as u32).to_le_bytes());
        self.bytes.extend_from_slice(&hash);
        self.bytes.extend_from_slice(&size.to_le_bytes());
        self.bytes.extend_from_slice(stored);
        self.align();
        self
    }

    /// Append a padding record of `length` total bytes.
    pub fn padding(mut self, length: u32) -> Self {
        self.bytes
            .extend_from_slice(&(length | AOL_PADDING_FLAG).to_le_bytes());
        self.bytes
            .extend(std::iter::repeat(0u8).take(length.saturating_sub(4) as usize));
        self.align();
        self
    }

    /// Append a bare 4-byte length field followed by nothing.
    pub fn raw_field(mut self, field: u32) -> Self {
        self.bytes.extend_from_slice(&field.to_le_bytes());
        self
    }

    /// Append arbitrary bytes.
    pub fn raw_bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    fn align(&mut self) {
        while self.bytes.len() % 4 != 0 {
            self.bytes.push(0);
        }
    }

    /// The file contents built so far.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Write the log to `path`.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

/// Builds a legacy index + data file pair slot by slot.
#[derive(Debug, Clone)]
pub struct LegacyStoreBuilder {
    magic: u32,
    slots: Vec<(i64, i32, i32)>,
    data: Vec<u8>,
}

impl Default for LegacyStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyStoreBuilder {
    /// Start an empty, cleanly closed store.
    ///
    /// The data file begins with a reserved block so no live payload sits at
    /// address 0, which marks a free slot.
    pub fn new() -> Self {
        LegacyStoreBuilder {
            magic: LEGACY_SAFELY_CLOSED_MAGIC,
            slots: Vec::new(),
            data: vec![0u8; 16],
        }
    }

    /// Override the index header magic.
    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    /// Append a slot holding an uncompressed payload with a zero hash.
    pub fn record(self, content: &[u8]) -> Self {
        self.raw_record([0u8; CONTENT_HASH_LEN], content.len() as i32, content)
    }

    /// Append a slot holding an LZ4-compressed payload.
    pub fn compressed_record(self, content: &[u8]) -> Self {
        let compressed = lz4_flex::block::compress(content);
        self.raw_record([0u8; CONTENT_HASH_LEN], -(content.len() as i32), &compressed)
    }

    /// Append a slot with an explicit hash, size field and stored bytes.
    pub fn raw_record(mut self, hash: [u8; CONTENT_HASH_LEN], size: i32, stored: &[u8]) -> Self {
        let address = self.data.len() as i64;
        self.data.extend_from_slice(&hash);
        self.data.extend_from_slice(&size.to_be_bytes());
        self.data.extend_from_slice(stored);
        let len = (self.data.len() as i64 - address) as i32;
        self.slots.push((address, len, len));
        self
    }

    /// Append a free slot.
    pub fn free_slot(self) -> Self {
        self.slot(0, 0, 0)
    }

    /// Append a slot with arbitrary fields.
    pub fn slot(mut self, address: i64, size: i32, capacity: i32) -> Self {
        self.slots.push((address, size, capacity));
        self
    }

    /// Write both files into `dir`, returning `(index, data)` paths.
    pub fn write_to(&self, dir: &Path) -> io::Result<(PathBuf, PathBuf)> {
        let index_path = dir.join(LEGACY_INDEX_FILE);
        let data_path = dir.join(LEGACY_DATA_FILE);

        let mut index = Vec::with_capacity(8 + self.slots.len() * 16);
        index.write_u32::<BigEndian>(self.magic)?;
        index.write_u32::<BigEndian>(1)?;
        for &(address, size, capacity) in &self.slots {
            index.write_i64::<BigEndian>(address)?;
            index.write_i32::<BigEndian>(size)?;
            index.write_i32::<BigEndian>(capacity)?;
        }

        std::fs::write(&index_path, &index)?;
        std::fs::write(&data_path, &self.data)?;
        Ok((index_path, data_path))
    }
}

/// Overwrite bytes of an existing file in place.
pub fn overwrite_at(path: &Path, offset: u64, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(bytes)?;
    file.sync_all()
}

