//! In-memory cache backend for testing.

use super::{CacheBackend, CacheEntry, CacheStats};
use crate::error::CacheError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

/// In-memory cache backend
///
/// Behaves like `SqliteCache` without touching disk.
pub struct InMemoryCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn poisoned() -> CacheError {
        CacheError::Corrupted {
            path: PathBuf::from("memory"),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for InMemoryCache {
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;

        Ok(entries
            .get(path)
            .filter(|entry| entry.is_valid_for(current_size, current_modified))
            .cloned())
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(entry.path.clone(), entry);
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.clear();
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;

        Ok(CacheStats {
            total_entries: entries.len(),
            oldest_entry: entries.values().map(|e| e.cached_at).min(),
            newest_entry: entries.values().map(|e| e.cached_at).max(),
        })
    }
}
