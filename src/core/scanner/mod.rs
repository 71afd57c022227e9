//! # Scanner Module
//!
//! Finds candidate files below a root directory.
//!
//! Raw files are searched recursively (memory cards nest them under
//! `DCIM/100MSDCF/...`); previews are read from a single flat folder.
//!
//! ## Example
//! ```rust,ignore
//! use raw_matcher::core::scanner::{ExtensionFilter, FileWalker, WalkDirScanner};
//!
//! let walker = WalkDirScanner::default();
//! let found = walker.walk(Path::new("/Volumes/CARD1"), &ExtensionFilter::raw())?;
//! ```

mod filter;
mod walker;

pub use filter::{ExtensionFilter, DEFAULT_PREVIEW_EXTENSIONS, DEFAULT_RAW_EXTENSIONS};
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use std::path::{Path, PathBuf};

/// Files found below one root
#[derive(Debug, Default)]
pub struct WalkResult {
    /// Matching files, in discovery order
    pub files: Vec<PathBuf>,
    /// Errors that occurred during the walk (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for directory walkers
///
/// Implement this trait to feed files from somewhere other than the local
/// filesystem (or from a fixed list in tests).
pub trait FileWalker: Send + Sync {
    /// Walk `root` and return every file accepted by `filter`
    fn walk(&self, root: &Path, filter: &ExtensionFilter) -> Result<WalkResult, ScanError>;
}
