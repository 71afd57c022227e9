//! Directory walking implementation using walkdir.

use super::{filter::ExtensionFilter, FileWalker, WalkResult};
use crate::error::ScanError;
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory walker
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to descend into hidden directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited, 1 = only the root's files)
    pub max_depth: Option<usize>,
}

impl ScanConfig {
    /// Only the files directly inside the root
    pub fn flat() -> Self {
        Self {
            max_depth: Some(1),
            ..Default::default()
        }
    }
}

/// Walker implementation using the walkdir crate
///
/// Entries are visited in file-name order so discovery order (and with it
/// tie-breaking between equally close candidates) is stable between runs.
#[derive(Debug, Clone, Default)]
pub struct WalkDirScanner {
    config: ScanConfig,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
    }
}

impl FileWalker for WalkDirScanner {
    fn walk(&self, root: &Path, filter: &ExtensionFilter) -> Result<WalkResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let mut result = WalkResult::default();

        for entry_result in walker
            .into_iter()
            .filter_entry(|e| include_hidden || !Self::is_hidden_dir(e))
        {
            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_file() && filter.should_include(entry.path()) {
                        result.files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path }
                    } else {
                        ScanError::ReadDirectory {
                            path,
                            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        }
                    };

                    result.errors.push(error);
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"raw").unwrap();
        path
    }

    #[test]
    fn walk_empty_directory_returns_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let result = WalkDirScanner::default()
            .walk(temp_dir.path(), &ExtensionFilter::raw())
            .unwrap();

        assert!(result.files.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn walk_filters_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "_DSC0001.ARW");
        touch(temp_dir.path(), "_DSC0001.JPG");
        touch(temp_dir.path(), "notes.txt");

        let result = WalkDirScanner::default()
            .walk(temp_dir.path(), &ExtensionFilter::raw())
            .unwrap();

        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].ends_with("_DSC0001.ARW"));
    }

    #[test]
    fn walk_traverses_nested_directories_in_name_order() {
        let temp_dir = TempDir::new().unwrap();
        let dcim = temp_dir.path().join("DCIM").join("100MSDCF");
        fs::create_dir_all(&dcim).unwrap();
        touch(&dcim, "_DSC0002.ARW");
        touch(&dcim, "_DSC0001.ARW");

        let result = WalkDirScanner::default()
            .walk(temp_dir.path(), &ExtensionFilter::raw())
            .unwrap();

        let names: Vec<_> = result
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["_DSC0001.ARW", "_DSC0002.ARW"]);
    }

    #[test]
    fn flat_config_ignores_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("rejects");
        fs::create_dir(&nested).unwrap();
        touch(temp_dir.path(), "IMG_0001.jpg");
        touch(&nested, "IMG_0002.jpg");

        let result = WalkDirScanner::new(ScanConfig::flat())
            .walk(temp_dir.path(), &ExtensionFilter::preview())
            .unwrap();

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn hidden_directories_are_skipped_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let hidden = temp_dir.path().join(".Trashes");
        fs::create_dir(&hidden).unwrap();
        touch(&hidden, "_DSC0001.ARW");
        touch(temp_dir.path(), "_DSC0002.ARW");

        let result = WalkDirScanner::default()
            .walk(temp_dir.path(), &ExtensionFilter::raw())
            .unwrap();
        assert_eq!(result.files.len(), 1);

        let config = ScanConfig {
            include_hidden: true,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config)
            .walk(temp_dir.path(), &ExtensionFilter::raw())
            .unwrap();
        assert_eq!(result.files.len(), 2);
    }

    #[test]
    fn walk_nonexistent_root_is_an_error() {
        let result = WalkDirScanner::default().walk(
            Path::new("/nonexistent/card/12345"),
            &ExtensionFilter::raw(),
        );
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
