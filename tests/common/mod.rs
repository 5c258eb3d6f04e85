//! Shared test utilities for the workspace integration suites.
//!
//! Import from a suite's main.rs with
//! `#[path = "../common/mod.rs"] mod common;`.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

use localhist::changelog::testing::{ChangeLogBuilder, ChangeSetBuilder};
use localhist::storage::testing::{AolFileBuilder, LegacyStoreBuilder};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route library logs to the test harness' captured output.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Clock
// ============================================================================

/// Change-set timestamps are 32-bit on the wire, so test time counts whole
/// days from the epoch and stays within about 24 days either side of it.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).unwrap() + Duration::days(n)
}

/// Millisecond timestamp of [`day`], as the change-log builder takes it.
pub fn day_millis(n: i64) -> i32 {
    day(n).timestamp_millis() as i32
}

// ============================================================================
// JetBrains cache root
// ============================================================================

/// A fake JetBrains cache root holding one IntelliJ IDEA directory.
pub struct IdeFixture {
    pub root: TempDir,
    pub ide_dir: PathBuf,
}

impl IdeFixture {
    pub fn new(name: &str) -> Self {
        let root = TempDir::new().unwrap();
        let ide_dir = root.path().join(name);
        std::fs::create_dir_all(ide_dir.join("caches")).unwrap();
        std::fs::create_dir_all(ide_dir.join("LocalHistory")).unwrap();
        IdeFixture { root, ide_dir }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn caches(&self) -> PathBuf {
        self.ide_dir.join("caches")
    }

    pub fn local_history(&self) -> PathBuf {
        self.ide_dir.join("LocalHistory")
    }

    pub fn write_log_store(&self, store: AolFileBuilder) {
        store.write_to(&self.caches().join("content.dat")).unwrap();
    }

    pub fn write_legacy_store(&self, store: LegacyStoreBuilder) {
        store.write_to(&self.caches()).unwrap();
    }

    pub fn write_change_log(&self, sets: &[ChangeSetBuilder]) {
        let log = sets
            .iter()
            .fold(ChangeLogBuilder::new(), |log, set| log.change_set(set));
        log.write_to(&self.local_history()).unwrap();
    }
}
