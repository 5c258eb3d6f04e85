//! Filtered traversal of every record in a content store.
//!
//! The scanner walks the ids a [`ContentReader`] lists, reads each record and
//! yields a lightweight [`ContentScanResult`] instead of the full content, so
//! a whole store can be browsed without holding it in memory.

use serde::Serialize;
use tracing::trace;

use localhist_core::{ContentId, ContentRecord};

use crate::reader::ContentReader;

/// Maximum number of characters kept in a preview before it is cut.
pub const PREVIEW_MAX_CHARS: usize = 500;

/// Number of leading lines kept in a preview.
pub const PREVIEW_LINES: usize = 10;

/// Filters applied while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound on the number of ids visited, matched or not
    pub max_records: usize,
    /// Skip records that do not look like text
    pub text_only: bool,
    /// Minimum content length in bytes
    pub min_size: usize,
    /// Maximum content length in bytes
    pub max_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            max_records: usize::MAX,
            text_only: false,
            min_size: 0,
            max_size: usize::MAX,
        }
    }
}

impl ScanConfig {
    /// Set the visit bound
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    /// Only yield text records
    pub fn with_text_only(mut self, text_only: bool) -> Self {
        self.text_only = text_only;
        self
    }

    /// Restrict content length to `[min, max]` bytes
    pub fn with_size_range(mut self, min: usize, max: usize) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }
}

/// Summary of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentMetadata {
    /// Record id
    pub content_id: ContentId,
    /// Lowercase hex of the stored hash
    pub hash_hex: String,
    /// Uncompressed size as stored in the record
    pub size: i32,
    /// Whether the record was stored compressed
    pub is_compressed: bool,
    /// Whether the content looks like text
    pub is_text: bool,
}

/// One scanned record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentScanResult {
    /// Record summary
    pub metadata: ContentMetadata,
    /// Leading lines of text content; `None` for binary content
    pub preview: Option<String>,
}

/// Lazy, filtered traversal over a content reader.
pub struct ContentScanner<'a, R: ContentReader + ?Sized> {
    reader: &'a R,
}

impl<'a, R: ContentReader + ?Sized> ContentScanner<'a, R> {
    /// Scan through `reader`.
    pub fn new(reader: &'a R) -> Self {
        ContentScanner { reader }
    }

    /// Yield a result for every readable record passing `config`.
    ///
    /// Ids that list but do not read are skipped. They still count toward
    /// `max_records`.
    pub fn scan(&self, config: &ScanConfig) -> impl Iterator<Item = ContentScanResult> + 'a {
        self.scan_records(config).map(|(_, result)| result)
    }

    /// Yield text records whose content contains `needle`.
    ///
    /// Each record is read once; the match runs on the record in hand.
    pub fn scan_containing(
        &self,
        needle: &'a str,
        config: &ScanConfig,
    ) -> impl Iterator<Item = ContentScanResult> + 'a {
        self.scan_records(config)
            .filter(move |(record, result)| {
                result.metadata.is_text && record.content_as_string().contains(needle)
            })
            .map(|(_, result)| result)
    }

    fn scan_records(
        &self,
        config: &ScanConfig,
    ) -> impl Iterator<Item = (ContentRecord, ContentScanResult)> + 'a {
        let reader = self.reader;
        let config = config.clone();
        reader
            .list_content_ids()
            .take(config.max_records)
            .filter_map(move |id| match reader.read_content(id) {
                Some(record) => summarize(&record, &config).map(|result| (record, result)),
                None => {
                    trace!(id, "Listed content id did not read, skipping");
                    None
                }
            })
    }

    /// Full content of one record.
    pub fn content(&self, id: ContentId) -> Option<Vec<u8>> {
        self.reader.read_content(id).map(|record| record.content)
    }
}

fn summarize(record: &ContentRecord, config: &ScanConfig) -> Option<ContentScanResult> {
    let len = record.content.len();
    if len < config.min_size || len > config.max_size {
        return None;
    }

    let is_text = record.is_text();
    if config.text_only && !is_text {
        return None;
    }

    Some(ContentScanResult {
        metadata: ContentMetadata {
            content_id: record.content_id,
            hash_hex: record.crypto_hash_hex(),
            size: record.uncompressed_size,
            is_compressed: record.is_compressed,
            is_text,
        },
        preview: is_text.then(|| preview(&record.content)),
    })
}

/// First [`PREVIEW_LINES`] lines of `content`, cut to [`PREVIEW_MAX_CHARS`].
///
/// A cut preview ends in `...`; an uncut one that dropped lines ends in
/// `\n...`.
pub fn preview(content: &[u8]) -> String {
    let text = String::from_utf8_lossy(content);
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let head = lines[..lines.len().min(PREVIEW_LINES)].join("\n");

    if head.chars().count() > PREVIEW_MAX_CHARS {
        let mut cut: String = head.chars().take(PREVIEW_MAX_CHARS).collect();
        cut.push_str("...");
        cut
    } else if lines.len() > PREVIEW_LINES {
        format!("{head}\n...")
    } else {
        head
    }
}
