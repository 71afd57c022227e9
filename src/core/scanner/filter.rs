//! Extension filtering for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Default raw extension (Sony ARW)
pub const DEFAULT_RAW_EXTENSIONS: &[&str] = &["arw"];

/// Default preview extensions
pub const DEFAULT_PREVIEW_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Accepts files by case-insensitive extension
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    /// Lowercase extensions without the dot
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ExtensionFilter {
    /// Accept the given extensions (dots and case are ignored)
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            include_hidden: false,
        }
    }

    /// Filter for raw camera files
    pub fn raw() -> Self {
        Self::new(DEFAULT_RAW_EXTENSIONS)
    }

    /// Filter for preview images
    pub fn preview() -> Self {
        Self::new(DEFAULT_PREVIEW_EXTENSIONS)
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}
