//! Content store format detection

use byteorder::{ByteOrder, LittleEndian};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use localhist_core::limits::AOL_MAGIC;
use localhist_core::StorageFormat;

use crate::paths::ContentStorePaths;

/// Detect which content store generation lives in `dir`.
///
/// `content.dat` starting with the append-only-log magic wins; otherwise a
/// legacy index + data pair selects the legacy format. Returns `None` when
/// neither is present.
pub fn detect_format(dir: &Path) -> Option<StorageFormat> {
    let paths = ContentStorePaths::from_root(dir);

    if read_magic(&paths.content_log()) == Some(AOL_MAGIC) {
        return Some(StorageFormat::AppendOnlyLog);
    }

    if paths.has_legacy_pair() {
        return Some(StorageFormat::LegacyPaged);
    }

    debug!(dir = %dir.display(), "No content storage detected");
    None
}

/// First four bytes of `path` as a little-endian integer, if readable.
fn read_magic(path: &Path) -> Option<u32> {
    let mut file = File::open(path).ok()?;
    let mut buf = [0u8; 4];
    file.read_exact(&mut buf).ok()?;
    Some(LittleEndian::read_u32(&buf))
}
