//! The human-readable run log kept in the output folder.

use crate::error::SetupError;
use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// File name of the run log inside the output folder
pub const RUN_LOG_FILE_NAME: &str = "log.txt";

const HEADER: &str = "Log of missing raw files:";

/// Append-only record of every preview that did not end up with a raw file
///
/// Lines are written whole under a lock, so parallel workers never
/// interleave. A failed write is logged and otherwise ignored.
pub struct RunLog {
    path: PathBuf,
    writer: Mutex<LineWriter<File>>,
}

impl RunLog {
    /// Create (or truncate) `<output_dir>/log.txt` and write the header
    pub fn create(output_dir: &Path) -> Result<Self, SetupError> {
        let path = output_dir.join(RUN_LOG_FILE_NAME);
        let open_error = |source| SetupError::RunLog {
            path: path.clone(),
            source,
        };

        let mut writer = LineWriter::new(File::create(&path).map_err(open_error)?);
        writeln!(writer, "{}", HEADER).map_err(open_error)?;

        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn unmatched(&self, preview: &str, reason: &str) {
        self.line(&format!("{}: no raw file copied ({})", preview, reason));
    }

    pub fn copy_failed(&self, source: &Path, destination: &Path, error: &str) {
        self.line(&format!(
            "Error copying {} to {}: {}",
            source.display(),
            destination.display(),
            error
        ));
    }

    pub fn collision(&self, source: &Path, destination: &Path, previous_source: &Path) {
        self.line(&format!(
            "{} overwrote {} (previously copied from {})",
            source.display(),
            destination.display(),
            previous_source.display()
        ));
    }

    pub fn unresolved(&self, preview: &str, reason: &str) {
        self.line(&format!("{}: left unresolved ({})", preview, reason));
    }

    fn line(&self, line: &str) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(writer, "{}", line) {
            warn!(path = %self.path.display(), error = %e, "Failed to write run log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn header_then_one_line_per_entry() {
        let temp_dir = TempDir::new().unwrap();
        let log = RunLog::create(temp_dir.path()).unwrap();

        log.unmatched("IMG_0009.jpg", "no raw file with this identity");
        log.copy_failed(Path::new("/a/_DSC0001.ARW"), Path::new("/out/_DSC0001.ARW"), "disk full");

        let content = fs::read_to_string(temp_dir.path().join(RUN_LOG_FILE_NAME)).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            "IMG_0009.jpg: no raw file copied (no raw file with this identity)"
        );
        assert!(lines[2].contains("disk full"));
    }

    #[test]
    fn concurrent_writers_never_interleave() {
        let temp_dir = TempDir::new().unwrap();
        let log = RunLog::create(temp_dir.path()).unwrap();

        (0..200).into_par_iter().for_each(|i| {
            log.unmatched(&format!("IMG_{:04}.jpg", i), "no candidate within tolerance");
        });

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().skip(1).collect();
        assert_eq!(lines.len(), 200);
        assert!(lines
            .iter()
            .all(|l| l.ends_with("no raw file copied (no candidate within tolerance)")));
    }

    #[test]
    fn missing_output_dir_is_a_setup_error() {
        let result = RunLog::create(Path::new("/nonexistent/output/12345"));
        assert!(matches!(result, Err(SetupError::RunLog { .. })));
    }
}
