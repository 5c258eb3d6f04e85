//! Content payload layout shared by both store generations.
//!
//! ```text
//! crypto_hash[20] + size(i32) + content[...]
//! ```
//!
//! A negative size flags compressed content; its magnitude is the
//! uncompressed length.

use byteorder::ByteOrder;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use localhist_core::limits::{CONTENT_HASH_LEN, MIN_CONTENT_PAYLOAD};
use localhist_core::{ContentId, ContentRecord};

use crate::codec::decompress;

/// Decode a payload whose size field is stored in byte order `B`.
///
/// Returns `None` when the payload is too short to hold the hash and size
/// field, or when the size field cannot be negated.
pub(crate) fn decode_payload<B: ByteOrder>(
    content_id: ContentId,
    payload: &[u8],
) -> Option<ContentRecord> {
    if payload.len() < MIN_CONTENT_PAYLOAD {
        return None;
    }

    let mut crypto_hash = [0u8; CONTENT_HASH_LEN];
    crypto_hash.copy_from_slice(&payload[..CONTENT_HASH_LEN]);

    let declared = B::read_i32(&payload[CONTENT_HASH_LEN..MIN_CONTENT_PAYLOAD]);
    let is_compressed = declared < 0;
    let uncompressed_size = declared.checked_abs()?;

    let stored = &payload[MIN_CONTENT_PAYLOAD..];
    let content = if is_compressed && !stored.is_empty() {
        decompress(stored, uncompressed_size as usize)
    } else {
        stored.to_vec()
    };

    Some(ContentRecord {
        content_id,
        crypto_hash,
        is_compressed,
        uncompressed_size,
        content,
    })
}

/// Read exactly `buf.len()` bytes at `offset` through a shared handle.
pub(crate) fn read_exact_at(file: &File, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    let mut handle = file;
    handle.seek(SeekFrom::Start(offset))?;
    handle.read_exact(buf)
}
