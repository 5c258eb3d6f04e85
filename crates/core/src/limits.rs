//! Fixed sizes of the on-disk formats
//!
//! These values come from the layouts written by the IDE and must not change.

/// Length of the stored content hash (SHA-1).
pub const CONTENT_HASH_LEN: usize = 20;

/// Smallest valid content payload: hash plus the signed size field.
pub const MIN_CONTENT_PAYLOAD: usize = CONTENT_HASH_LEN + 4;

/// Magic of an append-only-log `content.dat` ("MLOA" read little-endian).
pub const AOL_MAGIC: u32 = 0x414F_4C4D;

/// Size of the append-only-log header.
pub const AOL_HEADER_SIZE: u64 = 64;

/// Mask selecting the record length from an append-only-log length field.
///
/// Bit 31 flags padding. Bit 30 is reserved and never interpreted.
pub const AOL_LENGTH_MASK: u32 = 0x3FFF_FFFF;

/// Bit marking an append-only-log record as padding.
pub const AOL_PADDING_FLAG: u32 = 1 << 31;

/// Largest record length accepted before a length field is treated as corrupt.
pub const MAX_RECORD_LEN: u32 = 100_000_000;

/// Magic written by the legacy store when it was closed cleanly.
pub const LEGACY_SAFELY_CLOSED_MAGIC: u32 = 0x1f2f_3f4f;

/// Legacy index header: magic(4) + version(4).
pub const LEGACY_HEADER_SIZE: u64 = 8;

/// Legacy index slot: address(8) + size(4) + capacity(4).
pub const LEGACY_SLOT_SIZE: u64 = 16;

/// Change-log index header:
/// magic(4) + version(4) + last_id(8) + first_record(4) + last_record(4) + fs_timestamp(8).
pub const CHANGE_LOG_HEADER_SIZE: usize = 32;

/// Change-log index slot:
/// address(8) + size(4) + capacity(4) + prev(4) + next(4) + timestamp(8).
pub const CHANGE_LOG_SLOT_SIZE: usize = 32;
