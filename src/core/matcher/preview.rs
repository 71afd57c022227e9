//! Loading the user's selected previews.

use crate::core::cache::MetadataCache;
use crate::core::identity::IdentityPattern;
use crate::core::metadata::CaptureTime;
use crate::core::scanner::{ExtensionFilter, FileWalker};
use crate::error::ScanError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A preview the user kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPreview {
    pub file_name: String,
    pub path: PathBuf,
    /// None when the name carries no identity key
    pub identity_key: Option<String>,
    /// None when the capture time is unreadable
    pub captured_at: Option<CaptureTime>,
}

/// Previews found in the preview folder
#[derive(Debug, Default)]
pub struct PreviewLoad {
    /// In file-name order
    pub previews: Vec<SelectedPreview>,
    pub errors: Vec<String>,
}

/// Read every preview in `folder` along with its identity key and capture time
pub fn load_previews(
    walker: &dyn FileWalker,
    folder: &Path,
    filter: &ExtensionFilter,
    identity: &IdentityPattern,
    cache: &MetadataCache,
) -> Result<PreviewLoad, ScanError> {
    let walked = walker.walk(folder, filter)?;

    let errors = walked
        .errors
        .iter()
        .map(|e| {
            warn!(folder = %folder.display(), error = %e, "Problem while reading preview folder");
            e.to_string()
        })
        .collect();

    let previews = walked
        .files
        .par_iter()
        .map(|path| {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let identity_key = identity.extract(&file_name);
            let captured_at = cache.get(path);

            debug!(
                preview = %file_name,
                identity_key = ?identity_key,
                captured_at = ?captured_at,
                "Preview loaded"
            );

            SelectedPreview {
                file_name,
                path: path.clone(),
                identity_key,
                captured_at,
            }
        })
        .collect();

    Ok(PreviewLoad { previews, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::MetadataReader;
    use crate::core::scanner::{ScanConfig, WalkDirScanner};
    use crate::error::MetadataError;
    use chrono::NaiveDate;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedTime;

    impl MetadataReader for FixedTime {
        fn capture_time(&self, path: &Path) -> Result<CaptureTime, MetadataError> {
            if path.to_string_lossy().contains("broken") {
                return Err(MetadataError::MissingCaptureTime {
                    path: path.to_path_buf(),
                });
            }
            Ok(NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap())
        }
    }

    #[test]
    fn previews_carry_identity_and_time() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["IMG_0001.jpg", "_DSC0002.JPEG", "broken_0003.jpg", "notes.txt"] {
            fs::write(temp_dir.path().join(name), b"jpeg").unwrap();
        }
        let cache = MetadataCache::new(Arc::new(FixedTime));

        let load = load_previews(
            &WalkDirScanner::new(ScanConfig::flat()),
            temp_dir.path(),
            &ExtensionFilter::preview(),
            &IdentityPattern::default(),
            &cache,
        )
        .unwrap();

        assert_eq!(load.previews.len(), 3);
        let by_name = |name: &str| {
            load.previews
                .iter()
                .find(|p| p.file_name == name)
                .unwrap()
                .clone()
        };
        assert_eq!(by_name("IMG_0001.jpg").identity_key.as_deref(), Some("0001"));
        assert_eq!(by_name("_DSC0002.JPEG").identity_key.as_deref(), Some("0002"));
        assert!(by_name("IMG_0001.jpg").captured_at.is_some());

        let broken = by_name("broken_0003.jpg");
        assert!(broken.identity_key.is_none());
        assert!(broken.captured_at.is_none());
    }

    #[test]
    fn missing_preview_folder_is_an_error() {
        let cache = MetadataCache::new(Arc::new(FixedTime));
        let result = load_previews(
            &WalkDirScanner::new(ScanConfig::flat()),
            Path::new("/nonexistent/previews/12345"),
            &ExtensionFilter::preview(),
            &IdentityPattern::default(),
            &cache,
        );
        assert!(result.is_err());
    }
}
