//! # Matcher Module
//!
//! Decides, for every selected preview, which raw file it came from.
//!
//! ## Policy
//! 1. No identity key or no capture time on the preview: unmatched.
//! 2. No raw file under the key: unmatched.
//! 3. Exactly one raw file under the key: matched, timestamps are not compared.
//! 4. Several raw files: keep those within the tolerance window, nearest
//!    first, and defer them to a human even if only one survives.
//!
//! Matching is a pure function of the preview and the finished index, so
//! previews are evaluated in parallel without coordination.

mod preview;

pub use preview::{load_previews, PreviewLoad, SelectedPreview};

use crate::core::index::RawIndex;
use crate::core::metadata::CaptureTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default tolerance window in seconds
pub const DEFAULT_TOLERANCE_SECS: u64 = 60;

/// A raw file that might belong to a preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub path: PathBuf,
    pub captured_at: CaptureTime,
    /// Absolute distance to the preview's capture time
    pub delta_seconds: u64,
}

/// Why a preview has no raw file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnmatchedReason {
    IdentityOrTimestampUnavailable,
    NoRawWithIdentity,
    NoCandidateWithinTolerance,
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::IdentityOrTimestampUnavailable => {
                write!(f, "identity or timestamp unavailable")
            }
            UnmatchedReason::NoRawWithIdentity => write!(f, "no raw file with this identity"),
            UnmatchedReason::NoCandidateWithinTolerance => {
                write!(f, "no candidate within tolerance")
            }
        }
    }
}

/// What the matcher decided for one preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// The only raw file carrying the preview's identity
    Matched(PathBuf),
    /// Candidates within tolerance, nearest first; a human must choose
    Deferred(Vec<Candidate>),
    Unmatched(UnmatchedReason),
}

/// Applies the exact/fuzzy resolution policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    tolerance_secs: u64,
}

impl Matcher {
    pub fn new(tolerance_secs: u64) -> Self {
        Self { tolerance_secs }
    }

    /// Resolve one preview against the finished index
    pub fn match_preview(&self, preview: &SelectedPreview, index: &RawIndex) -> MatchOutcome {
        let (identity_key, preview_time) = match (&preview.identity_key, preview.captured_at) {
            (Some(key), Some(time)) => (key, time),
            _ => return MatchOutcome::Unmatched(UnmatchedReason::IdentityOrTimestampUnavailable),
        };

        match index.candidates(identity_key) {
            [] => MatchOutcome::Unmatched(UnmatchedReason::NoRawWithIdentity),
            [only] => MatchOutcome::Matched(only.path.clone()),
            several => {
                let mut survivors: Vec<Candidate> = several
                    .iter()
                    .map(|record| Candidate {
                        path: record.path.clone(),
                        captured_at: record.captured_at,
                        delta_seconds: (record.captured_at - preview_time)
                            .num_seconds()
                            .unsigned_abs(),
                    })
                    .filter(|c| c.delta_seconds <= self.tolerance_secs)
                    .collect();

                if survivors.is_empty() {
                    return MatchOutcome::Unmatched(UnmatchedReason::NoCandidateWithinTolerance);
                }

                // Stable: equal deltas keep discovery order
                survivors.sort_by_key(|c| c.delta_seconds);
                MatchOutcome::Deferred(survivors)
            }
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE_SECS)
    }
}
