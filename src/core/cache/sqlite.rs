//! SQLite cache backend for persistent storage.

use super::{CacheBackend, CacheEntry, CacheStats};
use crate::core::metadata::CaptureTime;
use crate::error::CacheError;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const CAPTURE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite-backed capture-time cache
///
/// Uses WAL mode so a second process can read while this one writes.
pub struct SqliteCache {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteCache {
    /// Open or create a cache database at the given path
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS capture_times (
                path TEXT PRIMARY KEY,
                captured_at TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                file_modified INTEGER NOT NULL,
                cached_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    /// Default location under the user's cache directory
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("raw-matcher")
            .join("capture-times.db")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Corrupted {
            path: self.db_path.clone(),
        })
    }

    fn to_timestamp(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs() as i64
    }

    fn from_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(timestamp.max(0) as u64)
    }
}

impl CacheBackend for SqliteCache {
    fn get(
        &self,
        path: &Path,
        current_size: u64,
        current_modified: SystemTime,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let conn = self.lock()?;
        let path_str = path.to_string_lossy();

        let result = conn.query_row(
            "SELECT captured_at, file_size, file_modified, cached_at
             FROM capture_times WHERE path = ?",
            [&path_str],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as u64,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        );

        let (captured_at, file_size, file_modified, cached_at) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(CacheError::QueryFailed(e.to_string())),
        };

        let capture_time: CaptureTime =
            NaiveDateTime::parse_from_str(&captured_at, CAPTURE_TIME_FORMAT).map_err(|_| {
                CacheError::Corrupted {
                    path: self.db_path.clone(),
                }
            })?;

        let entry = CacheEntry {
            path: path.to_path_buf(),
            capture_time,
            file_size,
            file_modified: Self::from_timestamp(file_modified),
            cached_at: Self::from_timestamp(cached_at),
        };

        if entry.is_valid_for(current_size, current_modified) {
            Ok(Some(entry))
        } else {
            Ok(None)
        }
    }

    fn set(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let conn = self.lock()?;
        let path_str = entry.path.to_string_lossy();

        conn.execute(
            "INSERT OR REPLACE INTO capture_times
             (path, captured_at, file_size, file_modified, cached_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                path_str,
                entry.capture_time.format(CAPTURE_TIME_FORMAT).to_string(),
                entry.file_size as i64,
                Self::to_timestamp(entry.file_modified),
                Self::to_timestamp(entry.cached_at),
            ],
        )
        .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM capture_times", [])
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;
        Ok(())
    }

    fn stats(&self) -> Result<CacheStats, CacheError> {
        let conn = self.lock()?;

        let (total_entries, oldest, newest) = conn
            .query_row(
                "SELECT COUNT(*), MIN(cached_at), MAX(cached_at) FROM capture_times",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)? as usize,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .map_err(|e| CacheError::QueryFailed(e.to_string()))?;

        Ok(CacheStats {
            total_entries,
            oldest_entry: oldest.map(Self::from_timestamp),
            newest_entry: newest.map(Self::from_timestamp),
        })
    }
}
