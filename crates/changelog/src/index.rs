//! Change-log index table.
//!
//! ```text
//! header (32 bytes, big-endian):
//!   magic(u32) + version(u32) + last_id(i64) + first_record(i32)
//!   + last_record(i32) + fs_timestamp(i64)
//!
//! slot (32 bytes, big-endian):
//!   address(i64) + size(i32) + capacity(i32) + prev_id(i32)
//!   + next_id(i32) + timestamp_millis(i64)
//! ```
//!
//! Slot `n` (1-based) is record `n`. Slots with `size <= 0` are free.

use byteorder::{BigEndian, ByteOrder};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use localhist_core::limits::{CHANGE_LOG_HEADER_SIZE, CHANGE_LOG_SLOT_SIZE};
use localhist_core::ChangeRecord;

use crate::error::{ChangeLogError, ChangeLogResult};

/// Fixed header of a change-log index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeLogHeader {
    /// Format magic
    pub magic: u32,
    /// Format version
    pub version: u32,
    /// Last allocated change id
    pub last_id: i64,
    /// First record of the chain
    pub first_record: i32,
    /// Last record of the chain
    pub last_record: i32,
    /// File-system timestamp the log was last synced against
    pub fs_timestamp: i64,
}

impl ChangeLogHeader {
    /// Decode the header from the first 32 bytes of the index.
    pub fn from_bytes(bytes: &[u8; CHANGE_LOG_HEADER_SIZE]) -> Self {
        ChangeLogHeader {
            magic: BigEndian::read_u32(&bytes[0..4]),
            version: BigEndian::read_u32(&bytes[4..8]),
            last_id: BigEndian::read_i64(&bytes[8..16]),
            first_record: BigEndian::read_i32(&bytes[16..20]),
            last_record: BigEndian::read_i32(&bytes[20..24]),
            fs_timestamp: BigEndian::read_i64(&bytes[24..32]),
        }
    }
}

fn decode_slot(id: i32, bytes: &[u8]) -> ChangeRecord {
    ChangeRecord {
        id,
        address: BigEndian::read_i64(&bytes[0..8]),
        size: BigEndian::read_i32(&bytes[8..12]),
        capacity: BigEndian::read_i32(&bytes[12..16]),
        prev_id: BigEndian::read_i32(&bytes[16..20]),
        next_id: BigEndian::read_i32(&bytes[20..24]),
        timestamp_millis: BigEndian::read_i64(&bytes[24..32]),
    }
}

/// Decode an index already in memory.
///
/// Returns `None` when `bytes` is shorter than the header. A trailing
/// partial slot is ignored.
pub fn parse_index(bytes: &[u8]) -> Option<(ChangeLogHeader, Vec<ChangeRecord>)> {
    let header_bytes: &[u8; CHANGE_LOG_HEADER_SIZE] =
        bytes.get(..CHANGE_LOG_HEADER_SIZE)?.try_into().ok()?;
    let header = ChangeLogHeader::from_bytes(header_bytes);

    let records = bytes[CHANGE_LOG_HEADER_SIZE..]
        .chunks_exact(CHANGE_LOG_SLOT_SIZE)
        .enumerate()
        .map(|(i, slot)| decode_slot(i as i32 + 1, slot))
        .filter(ChangeRecord::is_live)
        .collect();

    Some((header, records))
}

/// Read an index file and return its header and live records in slot order.
pub fn parse_index_file(path: &Path) -> ChangeLogResult<(ChangeLogHeader, Vec<ChangeRecord>)> {
    let bytes = std::fs::read(path)
        .map_err(|e| ChangeLogError::from_io("change-log index", path.to_path_buf(), e))?;

    let (header, records) = parse_index(&bytes).ok_or_else(|| ChangeLogError::TruncatedHeader {
        path: path.to_path_buf(),
        size: bytes.len() as u64,
        needed: CHANGE_LOG_HEADER_SIZE as u64,
    })?;

    debug!(
        path = %path.display(),
        file_len = bytes.len(),
        version = header.version,
        slots = (bytes.len() - CHANGE_LOG_HEADER_SIZE) / CHANGE_LOG_SLOT_SIZE,
        live = records.len(),
        "Parsed change-log index"
    );

    Ok((header, records))
}
