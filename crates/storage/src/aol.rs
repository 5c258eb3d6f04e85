//! Append-only-log content store reader.
//!
//! The newer store generation keeps every content record in a single
//! `content.dat` log:
//!
//! ```text
//! header (64 bytes): magic(u32 LE) + version(u32 LE) + reserved[56]
//! record:            length(u32 LE) + payload[length - 4]
//! ```
//!
//! The low 30 bits of `length` are the record's total length including the
//! length field itself; bit 31 marks a padding record and bit 30 is reserved.
//! Records start on 4-byte boundaries, and a record's id is derived from its
//! offset, so the log is addressable without any index.
//!
//! A zero length field is the append point: everything after it is
//! unwritten.

use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use localhist_core::limits::{
    AOL_HEADER_SIZE, AOL_LENGTH_MASK, AOL_MAGIC, AOL_PADDING_FLAG, MAX_RECORD_LEN,
    MIN_CONTENT_PAYLOAD,
};
use localhist_core::{ContentId, ContentRecord};

use crate::error::{StoreError, StoreResult};
use crate::record::{decode_payload, read_exact_at};

/// Byte offset of the record with the given id.
///
/// Ids below 1 map below the header and are never valid.
pub fn record_id_to_offset(id: ContentId) -> i64 {
    (id as i64 - 1) * 4 + AOL_HEADER_SIZE as i64
}

/// Record id of the record starting at `offset`.
///
/// Inverse of [`record_id_to_offset`] for every 4-byte aligned offset at or
/// past the header.
pub fn offset_to_record_id(offset: i64) -> ContentId {
    ((offset - AOL_HEADER_SIZE as i64) / 4 + 1) as ContentId
}

/// Total record length encoded in a length field, if it is plausible.
///
/// A record must at least hold its own 4-byte length field and may not
/// exceed the sanity ceiling.
fn record_length(field: u32) -> Option<u32> {
    let length = field & AOL_LENGTH_MASK;
    if length < 4 || length > MAX_RECORD_LEN {
        None
    } else {
        Some(length)
    }
}

/// Masked length of a length field, if a forward scan can step over it.
///
/// Lengths below 4 cannot hold a record but still advance the scan; only
/// zero and lengths past the ceiling end it.
fn scan_length(field: u32) -> Option<u32> {
    let length = field & AOL_LENGTH_MASK;
    if length == 0 || length > MAX_RECORD_LEN {
        None
    } else {
        Some(length)
    }
}

fn align4(value: u64) -> u64 {
    (value + 3) & !3
}

fn read_u32_le_at(file: &File, offset: u64) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    read_exact_at(file, offset, &mut buf)?;
    Ok(LittleEndian::read_u32(&buf))
}

/// Reader for an append-only-log `content.dat`.
///
/// The file length is captured at open time; no read goes past it.
pub struct AppendOnlyLogReader {
    path: PathBuf,
    file: File,
    file_len: u64,
    version: u32,
}

impl AppendOnlyLogReader {
    /// Open a log and validate its header.
    ///
    /// Fails if the file is missing, shorter than the header fields, or does
    /// not carry the append-only-log magic.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = File::open(path)
            .map_err(|e| StoreError::from_io("content log", path.to_path_buf(), e))?;
        let file_len = file
            .metadata()
            .map_err(|e| StoreError::from_io("content log", path.to_path_buf(), e))?
            .len();

        if file_len < 8 {
            return Err(StoreError::TruncatedHeader {
                path: path.to_path_buf(),
                size: file_len,
                needed: AOL_HEADER_SIZE,
            });
        }

        let mut header = [0u8; 8];
        read_exact_at(&file, 0, &mut header).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let magic = LittleEndian::read_u32(&header[0..4]);
        if magic != AOL_MAGIC {
            return Err(StoreError::InvalidMagic {
                path: path.to_path_buf(),
                expected: AOL_MAGIC,
                actual: magic,
            });
        }
        let version = LittleEndian::read_u32(&header[4..8]);

        debug!(path = %path.display(), file_len, version, "Opened append-only content log");

        Ok(AppendOnlyLogReader {
            path: path.to_path_buf(),
            file,
            file_len,
            version,
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format version from the header
    pub fn version(&self) -> u32 {
        self.version
    }

    /// File length captured at open time
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Read the record with the given id.
    ///
    /// Returns `None` for ids outside the written log, implausible length
    /// fields, records running past the end of file, undersized payloads and
    /// I/O failures.
    pub fn read_content(&self, id: ContentId) -> Option<ContentRecord> {
        let offset = record_id_to_offset(id);
        if offset < AOL_HEADER_SIZE as i64 || offset as u64 >= self.file_len {
            return None;
        }

        match self.read_record(id, offset as u64) {
            Ok(record) => record,
            Err(e) => {
                debug!(id, offset, error = %e, "Failed to read content record");
                None
            }
        }
    }

    fn read_record(&self, id: ContentId, offset: u64) -> std::io::Result<Option<ContentRecord>> {
        if offset + 4 > self.file_len {
            return Ok(None);
        }

        let Some(length) = record_length(read_u32_le_at(&self.file, offset)?) else {
            return Ok(None);
        };
        if offset + length as u64 > self.file_len {
            return Ok(None);
        }

        let mut payload = vec![0u8; length as usize - 4];
        read_exact_at(&self.file, offset + 4, &mut payload)?;
        Ok(decode_payload::<LittleEndian>(id, &payload))
    }

    /// Lazily enumerate the ids of all data records.
    ///
    /// Every call rescans the file from the header, so the result always
    /// reflects what is on disk.
    pub fn list_content_ids(&self) -> AolContentIds<'_> {
        AolContentIds {
            file: &self.file,
            file_len: self.file_len,
            offset: AOL_HEADER_SIZE,
            done: false,
        }
    }

    /// Number of data records, by full rescan.
    pub fn record_count(&self) -> usize {
        self.list_content_ids().count()
    }
}

/// Forward scan over an append-only log yielding data record ids.
///
/// Stops at the append point (a zero length field), at a masked length of
/// zero or past the ceiling, at a record running past the end of file, or on
/// I/O failure. Records too short to hold a payload are stepped over.
pub struct AolContentIds<'a> {
    file: &'a File,
    file_len: u64,
    offset: u64,
    done: bool,
}

impl<'a> AolContentIds<'a> {
    fn stop(&mut self) -> Option<ContentId> {
        self.done = true;
        None
    }
}

impl<'a> Iterator for AolContentIds<'a> {
    type Item = ContentId;

    fn next(&mut self) -> Option<ContentId> {
        while !self.done {
            if self.offset + 4 > self.file_len {
                return self.stop();
            }

            let field = match read_u32_le_at(self.file, self.offset) {
                Ok(field) => field,
                Err(e) => {
                    warn!(offset = self.offset, error = %e, "Content log scan aborted on read error");
                    return self.stop();
                }
            };

            if field == 0 {
                return self.stop();
            }

            let Some(length) = scan_length(field) else {
                warn!(offset = self.offset, field, "Corrupt record length, stopping content log scan");
                return self.stop();
            };

            let start = self.offset;
            let end = start + length as u64;
            if end > self.file_len {
                warn!(offset = start, length, "Record runs past end of content log, stopping scan");
                return self.stop();
            }
            self.offset = align4(end);

            let is_padding = field & AOL_PADDING_FLAG != 0;
            if !is_padding && (length as usize).saturating_sub(4) >= MIN_CONTENT_PAYLOAD {
                return Some(offset_to_record_id(start as i64));
            }
        }
        None
    }
}
