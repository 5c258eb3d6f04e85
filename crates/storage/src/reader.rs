//! Content reader contract and store handle.
//!
//! Both store generations implement [`ContentReader`]. [`open_store`] picks
//! the implementation for a directory and wraps it in a [`ContentStore`],
//! which owns the file handles until it is closed or dropped.

use std::path::Path;

use localhist_core::{ContentId, ContentRecord, StorageFormat};

use crate::aol::AppendOnlyLogReader;
use crate::detect::detect_format;
use crate::error::{StoreError, StoreResult};
use crate::legacy::LegacyPagedReader;
use crate::paths::ContentStorePaths;

/// Read access to a content store.
///
/// Readers share one file position per handle and are not meant to be used
/// from several threads at once.
pub trait ContentReader {
    /// Store generation this reader decodes.
    fn format(&self) -> StorageFormat;

    /// Read one record; `None` when the id holds no readable record.
    fn read_content(&self, id: ContentId) -> Option<ContentRecord>;

    /// Lazily enumerate readable ids, rescanning storage on every call.
    fn list_content_ids(&self) -> Box<dyn Iterator<Item = ContentId> + '_>;

    /// Number of records the store reports.
    fn record_count(&self) -> usize;
}

impl ContentReader for AppendOnlyLogReader {
    fn format(&self) -> StorageFormat {
        StorageFormat::AppendOnlyLog
    }

    fn read_content(&self, id: ContentId) -> Option<ContentRecord> {
        AppendOnlyLogReader::read_content(self, id)
    }

    fn list_content_ids(&self) -> Box<dyn Iterator<Item = ContentId> + '_> {
        Box::new(AppendOnlyLogReader::list_content_ids(self))
    }

    fn record_count(&self) -> usize {
        AppendOnlyLogReader::record_count(self)
    }
}

impl ContentReader for LegacyPagedReader {
    fn format(&self) -> StorageFormat {
        StorageFormat::LegacyPaged
    }

    fn read_content(&self, id: ContentId) -> Option<ContentRecord> {
        LegacyPagedReader::read_content(self, id)
    }

    fn list_content_ids(&self) -> Box<dyn Iterator<Item = ContentId> + '_> {
        Box::new(LegacyPagedReader::list_content_ids(self))
    }

    fn record_count(&self) -> usize {
        LegacyPagedReader::record_count(self)
    }
}

/// An open content store of either generation.
pub enum ContentStore {
    /// Append-only-log store
    AppendOnlyLog(AppendOnlyLogReader),
    /// Legacy paged store
    LegacyPaged(LegacyPagedReader),
}

impl ContentStore {
    fn reader(&self) -> &dyn ContentReader {
        match self {
            ContentStore::AppendOnlyLog(r) => r,
            ContentStore::LegacyPaged(r) => r,
        }
    }

    /// Release the underlying file handles.
    pub fn close(self) {
        drop(self);
    }
}

impl ContentReader for ContentStore {
    fn format(&self) -> StorageFormat {
        self.reader().format()
    }

    fn read_content(&self, id: ContentId) -> Option<ContentRecord> {
        self.reader().read_content(id)
    }

    fn list_content_ids(&self) -> Box<dyn Iterator<Item = ContentId> + '_> {
        self.reader().list_content_ids()
    }

    fn record_count(&self) -> usize {
        self.reader().record_count()
    }
}

/// Open the content store in `dir`, whichever generation it is.
///
/// Returns `StoreError::NotFound` when the directory holds no store.
pub fn open_store(dir: &Path) -> StoreResult<ContentStore> {
    let paths = ContentStorePaths::from_root(dir);
    match detect_format(dir) {
        Some(StorageFormat::AppendOnlyLog) => Ok(ContentStore::AppendOnlyLog(
            AppendOnlyLogReader::open(&paths.content_log())?,
        )),
        Some(StorageFormat::LegacyPaged) => Ok(ContentStore::LegacyPaged(
            LegacyPagedReader::open(&paths.legacy_index(), &paths.legacy_data())?,
        )),
        None => Err(StoreError::NotFound {
            dir: dir.to_path_buf(),
        }),
    }
}
