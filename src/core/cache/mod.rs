//! # Cache Module
//!
//! Memoizes capture-time lookups so no file is parsed twice.
//!
//! ## Layers
//! - `MetadataCache` - per-run memo shared by all workers. Once a path has
//!   been looked up (readable or not) the answer never changes for the run.
//! - `CacheBackend` - optional persistent store consulted on a memo miss, so
//!   re-running over the same cards skips the EXIF parse entirely.
//!
//! ## Backends
//! - `SqliteCache` - Persistent storage using SQLite
//! - `InMemoryCache` - For testing

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryCache;
pub use sqlite::SqliteCache;
pub use traits::CacheBackend;

use crate::core::metadata::{CaptureTime, MetadataReader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use tracing::{debug, warn};

/// A persisted capture-time entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Path to the file
    pub path: PathBuf,
    /// Capture time read from the file
    pub capture_time: CaptureTime,
    /// File size at time of reading
    pub file_size: u64,
    /// File modification time at time of reading
    pub file_modified: SystemTime,
    /// When the entry was cached
    pub cached_at: SystemTime,
}

impl CacheEntry {
    /// Check if this entry is still valid for a file
    pub fn is_valid_for(&self, file_size: u64, file_modified: SystemTime) -> bool {
        // SQLite stores whole seconds
        let cached_secs = self
            .file_modified
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let current_secs = file_modified
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.file_size == file_size && cached_secs == current_secs
    }
}

/// Persistent cache statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Oldest entry timestamp
    pub oldest_entry: Option<SystemTime>,
    /// Newest entry timestamp
    pub newest_entry: Option<SystemTime>,
}

/// Counters for one run of the memo layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupStats {
    /// Answered from the in-run memo
    pub memo_hits: usize,
    /// Answered from the persistent backend
    pub persistent_hits: usize,
    /// Answered by actually reading the file
    pub reads: usize,
}

/// Where a lookup was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrigin {
    Memo,
    Persistent,
    Read,
}

impl LookupOrigin {
    /// Whether the file itself was left untouched
    pub fn is_hit(&self) -> bool {
        !matches!(self, LookupOrigin::Read)
    }
}

/// Shared, thread-safe capture-time memo
///
/// Concurrent lookups of the same uncached path may both read the file;
/// whichever result lands first is kept and returned to both.
pub struct MetadataCache {
    reader: Arc<dyn MetadataReader>,
    backend: Option<Arc<dyn CacheBackend>>,
    memo: RwLock<HashMap<PathBuf, Option<CaptureTime>>>,
    memo_hits: AtomicUsize,
    persistent_hits: AtomicUsize,
    reads: AtomicUsize,
}

impl MetadataCache {
    /// Create a memo over the given reader
    pub fn new(reader: Arc<dyn MetadataReader>) -> Self {
        Self {
            reader,
            backend: None,
            memo: RwLock::new(HashMap::new()),
            memo_hits: AtomicUsize::new(0),
            persistent_hits: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    /// Consult (and fill) a persistent backend on memo misses
    pub fn with_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Capture time of `path`, or `None` if it cannot be read
    pub fn get(&self, path: &Path) -> Option<CaptureTime> {
        self.lookup(path).0
    }

    /// Capture time of `path` together with where the answer came from
    pub fn lookup(&self, path: &Path) -> (Option<CaptureTime>, LookupOrigin) {
        if let Ok(memo) = self.memo.read() {
            if let Some(cached) = memo.get(path) {
                self.memo_hits.fetch_add(1, Ordering::Relaxed);
                return (*cached, LookupOrigin::Memo);
            }
        }

        let (value, origin) = self.compute(path);

        // A poisoned lock only means another worker panicked mid-insert;
        // the map itself is still a valid memo.
        let mut memo = match self.memo.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let stored = *memo.entry(path.to_path_buf()).or_insert(value);
        (stored, origin)
    }

    /// Number of paths memoized so far
    pub fn len(&self) -> usize {
        self.memo.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters since the memo was created
    pub fn stats(&self) -> LookupStats {
        LookupStats {
            memo_hits: self.memo_hits.load(Ordering::Relaxed),
            persistent_hits: self.persistent_hits.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
        }
    }

    fn compute(&self, path: &Path) -> (Option<CaptureTime>, LookupOrigin) {
        let file_stamp = self
            .backend
            .as_ref()
            .and_then(|_| fs::metadata(path).ok())
            .map(|m| (m.len(), m.modified().unwrap_or(std::time::UNIX_EPOCH)));

        if let (Some(backend), Some((size, modified))) = (&self.backend, file_stamp) {
            match backend.get(path, size, modified) {
                Ok(Some(entry)) => {
                    self.persistent_hits.fetch_add(1, Ordering::Relaxed);
                    return (Some(entry.capture_time), LookupOrigin::Persistent);
                }
                Ok(None) => {}
                Err(e) => debug!(path = %path.display(), error = %e, "Persistent cache lookup failed"),
            }
        }

        self.reads.fetch_add(1, Ordering::Relaxed);
        match self.reader.capture_time(path) {
            Ok(capture_time) => {
                if let (Some(backend), Some((size, modified))) = (&self.backend, file_stamp) {
                    let entry = CacheEntry {
                        path: path.to_path_buf(),
                        capture_time,
                        file_size: size,
                        file_modified: modified,
                        cached_at: SystemTime::now(),
                    };
                    if let Err(e) = backend.set(entry) {
                        debug!(path = %path.display(), error = %e, "Failed to persist capture time");
                    }
                }
                (Some(capture_time), LookupOrigin::Read)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error reading metadata");
                (None, LookupOrigin::Read)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetadataError;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Reader answering from a table and counting calls per path
    struct CountingReader {
        times: HashMap<PathBuf, CaptureTime>,
        calls: Mutex<HashMap<PathBuf, usize>>,
    }

    impl CountingReader {
        fn new(times: Vec<(PathBuf, CaptureTime)>) -> Self {
            Self {
                times: times.into_iter().collect(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls_for(&self, path: &Path) -> usize {
            self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
        }
    }

    impl MetadataReader for CountingReader {
        fn capture_time(&self, path: &Path) -> Result<CaptureTime, MetadataError> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(path.to_path_buf())
                .or_insert(0) += 1;
            self.times
                .get(path)
                .copied()
                .ok_or_else(|| MetadataError::MissingCaptureTime {
                    path: path.to_path_buf(),
                })
        }
    }

    fn at(h: u32, m: u32, s: u32) -> CaptureTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn cache_entry_valid_when_unchanged() {
        let now = SystemTime::now();
        let entry = CacheEntry {
            path: PathBuf::from("/card/_DSC0001.ARW"),
            capture_time: at(10, 0, 0),
            file_size: 1000,
            file_modified: now,
            cached_at: now,
        };

        assert!(entry.is_valid_for(1000, now));
        assert!(!entry.is_valid_for(2000, now));
        assert!(!entry.is_valid_for(1000, now + std::time::Duration::from_secs(60)));
    }

    #[test]
    fn repeated_lookup_reads_file_once() {
        let path = PathBuf::from("/card/_DSC0001.ARW");
        let reader = Arc::new(CountingReader::new(vec![(path.clone(), at(10, 0, 0))]));
        let cache = MetadataCache::new(reader.clone());

        let first = cache.get(&path);
        let second = cache.get(&path);

        assert_eq!(first, Some(at(10, 0, 0)));
        assert_eq!(first, second);
        assert_eq!(reader.calls_for(&path), 1);
        assert_eq!(cache.stats().memo_hits, 1);
        assert_eq!(cache.stats().reads, 1);
    }

    #[test]
    fn unreadable_result_is_memoized_too() {
        let path = PathBuf::from("/card/_DSC0009.ARW");
        let reader = Arc::new(CountingReader::new(vec![]));
        let cache = MetadataCache::new(reader.clone());

        assert_eq!(cache.get(&path), None);
        assert_eq!(cache.get(&path), None);
        assert_eq!(reader.calls_for(&path), 1);
    }

    #[test]
    fn concurrent_lookups_converge() {
        use rayon::prelude::*;

        let path = PathBuf::from("/card/_DSC0042.ARW");
        let reader = Arc::new(CountingReader::new(vec![(path.clone(), at(12, 30, 0))]));
        let cache = MetadataCache::new(reader.clone());

        let results: Vec<_> = (0..64).into_par_iter().map(|_| cache.get(&path)).collect();

        assert!(results.iter().all(|r| *r == Some(at(12, 30, 0))));
        assert_eq!(cache.len(), 1);
        assert!(reader.calls_for(&path) >= 1);
    }

    #[test]
    fn persistent_backend_short_circuits_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_DSC0001.ARW");
        std::fs::write(&path, b"raw bytes").unwrap();

        let backend = Arc::new(InMemoryCache::new());
        let reader = Arc::new(CountingReader::new(vec![(path.clone(), at(10, 0, 0))]));

        // First run reads the file and fills the backend
        let first_run = MetadataCache::new(reader.clone()).with_backend(backend.clone());
        assert_eq!(first_run.get(&path), Some(at(10, 0, 0)));
        assert_eq!(reader.calls_for(&path), 1);

        // Second run is answered by the backend
        let second_run = MetadataCache::new(reader.clone()).with_backend(backend);
        let (value, origin) = second_run.lookup(&path);
        assert_eq!(value, Some(at(10, 0, 0)));
        assert_eq!(origin, LookupOrigin::Persistent);
        assert_eq!(reader.calls_for(&path), 1);
    }

    #[test]
    fn unreadable_results_are_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("_DSC0002.ARW");
        std::fs::write(&path, b"corrupt").unwrap();

        let backend = Arc::new(InMemoryCache::new());
        let reader = Arc::new(CountingReader::new(vec![]));
        let cache = MetadataCache::new(reader).with_backend(backend.clone());

        assert_eq!(cache.get(&path), None);
        assert_eq!(backend.stats().unwrap().total_entries, 0);
    }
}
