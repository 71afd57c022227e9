//! Cache backend trait definition.

use super::{CacheEntry, CacheStats};
use crate::error::CacheError;
use std::path::Path;
use std::time::SystemTime;

/// Trait for persistent capture-time stores
pub trait CacheBackend: Send + Sync {
    /// Get a cached capture time if it exists and is still valid
    ///
    /// The entry is only returned if the file's size and modification time
    /// still match what was recorded.
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
    ) -> Result<Option<CacheEntry>, CacheError>;

    /// Store a capture time
    fn set(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Clear all cached entries
    fn clear(&self) -> Result<(), CacheError>;

    /// Get cache statistics
    fn stats(&self) -> Result<CacheStats, CacheError>;
}
