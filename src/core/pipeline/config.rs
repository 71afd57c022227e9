//! Run configuration.

use crate::core::identity::DEFAULT_PREFIXES;
use crate::core::index::{BatchPlan, DEFAULT_AVG_RAW_SIZE_BYTES};
use crate::core::matcher::DEFAULT_TOLERANCE_SECS;
use crate::core::scanner::{DEFAULT_PREVIEW_EXTENSIONS, DEFAULT_RAW_EXTENSIONS};
use crate::error::{RawMatchError, SetupError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of worker threads
pub const DEFAULT_WORKERS: usize = 8;

/// Everything a run needs to know
///
/// Can be read from a TOML file; every field has a default, so a file only
/// needs the values it changes.
///
/// ```toml
/// preview_folder = "/Users/me/Pictures/keepers"
/// source_folders = ["/Volumes/CARD1", "/Volumes/CARD2"]
/// output_folder = "/Users/me/Pictures/raw"
/// tolerance_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Folder holding the selected previews (not searched recursively)
    pub preview_folder: Option<PathBuf>,
    /// Card folders searched recursively for raw files
    pub source_folders: Vec<PathBuf>,
    /// Where matched raw files are copied to; created if absent
    pub output_folder: Option<PathBuf>,
    /// Size of the worker pool
    pub workers: usize,
    /// Largest capture-time difference accepted for a shared identity key
    pub tolerance_secs: u64,
    /// Inspect at most this many raw files at a time
    pub batch_size: Option<usize>,
    /// Raw file extension, without dot, any case
    pub raw_extension: String,
    /// Preview file extensions, without dot, any case
    pub preview_extensions: Vec<String>,
    /// Literal file-name prefixes that precede the four-digit shot number
    pub identity_prefixes: Vec<String>,
    /// Descend into hidden folders on the cards
    pub include_hidden: bool,
    /// Match and report without copying
    pub dry_run: bool,
    /// Persistent capture-time cache database
    pub cache_path: Option<PathBuf>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            preview_folder: None,
            source_folders: Vec::new(),
            output_folder: None,
            workers: DEFAULT_WORKERS,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            batch_size: None,
            raw_extension: DEFAULT_RAW_EXTENSIONS[0].to_string(),
            preview_extensions: DEFAULT_PREVIEW_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            identity_prefixes: DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect(),
            include_hidden: false,
            dry_run: false,
            cache_path: None,
        }
    }
}

impl MatchConfig {
    /// Read a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, RawMatchError> {
        let content = fs::read_to_string(path).map_err(|e| {
            RawMatchError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| RawMatchError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Check everything that must hold before any work starts
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.workers == 0 {
            return Err(SetupError::InvalidWorkerCount { value: 0 });
        }

        let preview_folder = self
            .preview_folder
            .as_ref()
            .ok_or(SetupError::MissingSetting {
                name: "preview folder",
            })?;
        if !preview_folder.is_dir() {
            return Err(SetupError::PreviewFolderNotFound {
                path: preview_folder.clone(),
            });
        }

        if self.source_folders.is_empty() {
            return Err(SetupError::NoSourceFolders);
        }
        if let Some(missing) = self.source_folders.iter().find(|p| !p.is_dir()) {
            return Err(SetupError::SourceFolderNotFound {
                path: missing.clone(),
            });
        }

        if self.output_folder.is_none() {
            return Err(SetupError::MissingSetting {
                name: "output folder",
            });
        }

        Ok(())
    }

    /// The batching plan, if batching is enabled
    pub fn batch_plan(&self) -> Option<BatchPlan> {
        self.batch_size
            .map(|size| BatchPlan::with_batch_size(size, DEFAULT_AVG_RAW_SIZE_BYTES))
    }
}
