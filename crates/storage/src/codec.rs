//! Payload decompression shared by both store readers.
//!
//! The IDE compresses large contents with LZ4 block format; older builds used
//! deflate. A stored payload carries no codec tag, only a declared
//! uncompressed size, so decoding is a fallback chain:
//!
//! 1. LZ4 block decompression to exactly the declared size
//! 2. zlib-wrapped inflate, then raw deflate, truncated to what was produced
//! 3. the stored bytes verbatim
//!
//! Decompression never fails; the worst case is the input handed back.

use flate2::{Decompress, FlushDecompress};
use tracing::trace;

/// Largest declared size an output buffer is allocated for.
///
/// A corrupt size field beyond this returns the stored bytes unchanged.
pub const MAX_INFLATED_LEN: usize = 1 << 30;

/// Upper bound on LZ4 block expansion per input byte.
const LZ4_MAX_RATIO: usize = 255;

/// Upper bound on deflate expansion per input byte.
const DEFLATE_MAX_RATIO: usize = 1032;

/// Decompress `data` to `expected_size` bytes on a best-effort basis.
pub fn decompress(data: &[u8], expected_size: usize) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    if expected_size > MAX_INFLATED_LEN {
        trace!(expected_size, "Declared size exceeds ceiling, keeping raw bytes");
        return data.to_vec();
    }

    if let Some(out) = lz4_block(data, expected_size) {
        return out;
    }

    if let Some(out) = inflate(data, expected_size, true) {
        return out;
    }

    if let Some(out) = inflate(data, expected_size, false) {
        return out;
    }

    trace!(len = data.len(), expected_size, "No codec matched, keeping raw bytes");
    data.to_vec()
}

fn lz4_block(data: &[u8], expected_size: usize) -> Option<Vec<u8>> {
    if expected_size > data.len().saturating_mul(LZ4_MAX_RATIO) {
        return None;
    }
    let mut out = vec![0u8; expected_size];
    match lz4_flex::block::decompress_into(data, &mut out) {
        Ok(written) if written == expected_size => Some(out),
        _ => None,
    }
}

fn inflate(data: &[u8], expected_size: usize, zlib_header: bool) -> Option<Vec<u8>> {
    let mut inflater = Decompress::new(zlib_header);
    // the output never grows past this capacity
    let capacity = expected_size.min(data.len().saturating_mul(DEFLATE_MAX_RATIO));
    let mut out = Vec::with_capacity(capacity);
    match inflater.decompress_vec(data, &mut out, FlushDecompress::Finish) {
        Ok(_) if !out.is_empty() || expected_size == 0 => Some(out),
        _ => None,
    }
}
