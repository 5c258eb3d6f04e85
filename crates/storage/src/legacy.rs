//! Legacy paged content store reader.
//!
//! Older IDE builds split the content store into a slot index and a heap:
//!
//! ```text
//! content.dat.storageRecordIndex:
//!   header: magic(u32 BE) + version(u32 BE)
//!   slot:   address(i64 BE) + size(i32 BE) + capacity(i32 BE)    (16 bytes)
//!
//! content.dat.storageData:
//!   payload bytes at [address, address + size)
//! ```
//!
//! Slot `n` (1-based) describes content id `n`. A slot with a non-positive
//! address or size is free.

use byteorder::{BigEndian, ByteOrder};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use localhist_core::limits::{LEGACY_HEADER_SIZE, LEGACY_SAFELY_CLOSED_MAGIC, LEGACY_SLOT_SIZE};
use localhist_core::{ContentId, ContentRecord};

use crate::error::{StoreError, StoreResult};
use crate::record::{decode_payload, read_exact_at};

/// One slot of the legacy index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacySlot {
    /// Payload offset in the data file
    pub address: i64,
    /// Payload length in bytes
    pub size: i32,
    /// Allocated length in bytes
    pub capacity: i32,
}

impl LegacySlot {
    /// Decode a slot from its 16 on-disk bytes.
    pub fn from_bytes(bytes: &[u8; LEGACY_SLOT_SIZE as usize]) -> Self {
        LegacySlot {
            address: BigEndian::read_i64(&bytes[0..8]),
            size: BigEndian::read_i32(&bytes[8..12]),
            capacity: BigEndian::read_i32(&bytes[12..16]),
        }
    }

    /// Whether the slot points at a payload.
    pub fn is_live(&self) -> bool {
        self.address > 0 && self.size > 0
    }
}

/// Reader for a legacy index + data file pair.
pub struct LegacyPagedReader {
    index_path: PathBuf,
    data_path: PathBuf,
    index: File,
    data: File,
    data_len: u64,
    record_count: usize,
    magic: u32,
    version: u32,
}

impl LegacyPagedReader {
    /// Open an index and data file pair.
    ///
    /// Fails if either file is missing or the index is shorter than its
    /// header. A header magic other than the clean-shutdown marker is logged
    /// and tolerated.
    pub fn open(index_path: &Path, data_path: &Path) -> StoreResult<Self> {
        let index = File::open(index_path)
            .map_err(|e| StoreError::from_io("legacy index", index_path.to_path_buf(), e))?;
        let data = File::open(data_path)
            .map_err(|e| StoreError::from_io("legacy data", data_path.to_path_buf(), e))?;

        let index_len = index
            .metadata()
            .map_err(|e| StoreError::from_io("legacy index", index_path.to_path_buf(), e))?
            .len();
        let data_len = data
            .metadata()
            .map_err(|e| StoreError::from_io("legacy data", data_path.to_path_buf(), e))?
            .len();

        if index_len < LEGACY_HEADER_SIZE {
            return Err(StoreError::TruncatedHeader {
                path: index_path.to_path_buf(),
                size: index_len,
                needed: LEGACY_HEADER_SIZE,
            });
        }

        let mut header = [0u8; LEGACY_HEADER_SIZE as usize];
        read_exact_at(&index, 0, &mut header).map_err(|e| StoreError::Io {
            path: index_path.to_path_buf(),
            source: e,
        })?;
        let magic = BigEndian::read_u32(&header[0..4]);
        let version = BigEndian::read_u32(&header[4..8]);

        if magic != LEGACY_SAFELY_CLOSED_MAGIC {
            warn!(
                path = %index_path.display(),
                magic,
                "Legacy content storage was not closed cleanly"
            );
        }

        let record_count = ((index_len - LEGACY_HEADER_SIZE) / LEGACY_SLOT_SIZE) as usize;

        debug!(
            index = %index_path.display(),
            data_len,
            record_count,
            version,
            "Opened legacy content storage"
        );

        Ok(LegacyPagedReader {
            index_path: index_path.to_path_buf(),
            data_path: data_path.to_path_buf(),
            index,
            data,
            data_len,
            record_count,
            magic,
            version,
        })
    }

    /// Path of the index file
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Path of the data file
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Header magic
    pub fn magic(&self) -> u32 {
        self.magic
    }

    /// Header version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of slots in the index, free or not.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    fn in_range(&self, id: ContentId) -> bool {
        id >= 1 && (id as usize) <= self.record_count
    }

    /// Read the index slot for `id`.
    ///
    /// Returns `None` for ids outside `[1, record_count]` or on I/O failure.
    pub fn read_slot(&self, id: ContentId) -> Option<LegacySlot> {
        if !self.in_range(id) {
            return None;
        }
        let offset = LEGACY_HEADER_SIZE + (id as u64 - 1) * LEGACY_SLOT_SIZE;
        let mut bytes = [0u8; LEGACY_SLOT_SIZE as usize];
        match read_exact_at(&self.index, offset, &mut bytes) {
            Ok(()) => Some(LegacySlot::from_bytes(&bytes)),
            Err(e) => {
                debug!(id, offset, error = %e, "Failed to read legacy index slot");
                None
            }
        }
    }

    /// Read the record with the given id.
    ///
    /// Returns `None` for out-of-range ids, free slots, payloads running past
    /// the end of the data file, undersized payloads and I/O failures.
    pub fn read_content(&self, id: ContentId) -> Option<ContentRecord> {
        let slot = self.read_slot(id)?;
        if !slot.is_live() {
            return None;
        }

        let address = slot.address as u64;
        let size = slot.size as u64;
        if address + size > self.data_len {
            debug!(id, address, size, data_len = self.data_len, "Legacy payload exceeds data file");
            return None;
        }

        let mut payload = vec![0u8; slot.size as usize];
        if let Err(e) = read_exact_at(&self.data, address, &mut payload) {
            debug!(id, address, error = %e, "Failed to read legacy payload");
            return None;
        }

        decode_payload::<BigEndian>(id, &payload)
    }

    /// Lazily enumerate the ids of all live slots.
    pub fn list_content_ids(&self) -> LegacyContentIds<'_> {
        LegacyContentIds {
            reader: self,
            next: 1,
        }
    }
}

/// Linear scan over the legacy index yielding ids of live slots.
pub struct LegacyContentIds<'a> {
    reader: &'a LegacyPagedReader,
    next: usize,
}

impl<'a> Iterator for LegacyContentIds<'a> {
    type Item = ContentId;

    fn next(&mut self) -> Option<ContentId> {
        while self.next <= self.reader.record_count {
            let id = self.next as ContentId;
            self.next += 1;
            match self.reader.read_slot(id) {
                Some(slot) if slot.is_live() => return Some(id),
                Some(_) => continue,
                None => {
                    warn!(id, "Legacy index scan aborted on unreadable slot");
                    self.next = self.reader.record_count + 1;
                    return None;
                }
            }
        }
        None
    }
}
