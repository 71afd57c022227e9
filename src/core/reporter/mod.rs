//! # Reporter Module
//!
//! Records what happened to every preview.
//!
//! Nothing is ever dropped silently: each preview ends the run with exactly
//! one `PreviewReport`, and every preview that did not get a raw file also
//! gets a line in the run log.
//!
//! ## Outputs
//! - `RunLog` - `<output>/log.txt`, written while the run is in progress
//! - `export_csv` - optional per-preview report

mod export;
mod run_log;

pub use export::export_csv;
pub use run_log::{RunLog, RUN_LOG_FILE_NAME};

use crate::core::metadata::CaptureTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Final state of one preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    /// Raw file copied without human input
    Matched,
    /// Raw file copied after the user chose it
    Resolved,
    Unmatched,
    /// A raw file was chosen but copying it failed
    CopyFailed,
    /// A raw file was chosen but this was a dry run
    Skipped,
    /// The run stopped before the user chose a raw file
    Unresolved,
}

impl fmt::Display for PreviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PreviewStatus::Matched => "matched",
            PreviewStatus::Resolved => "resolved",
            PreviewStatus::Unmatched => "unmatched",
            PreviewStatus::CopyFailed => "copy_failed",
            PreviewStatus::Skipped => "skipped",
            PreviewStatus::Unresolved => "unresolved",
        };
        write!(f, "{}", s)
    }
}

/// One row of the per-preview report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewReport {
    /// Preview file name
    pub preview: String,
    pub identity_key: Option<String>,
    pub captured_at: Option<CaptureTime>,
    pub status: PreviewStatus,
    /// Raw file chosen for the preview, if any
    pub raw_path: Option<PathBuf>,
    /// Reason, error or collision note
    pub detail: String,
}
