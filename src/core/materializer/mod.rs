//! # Materializer Module
//!
//! Copies resolved raw files into the output folder.
//!
//! The destination is always `<output>/<basename of the raw file>`. Sources
//! are only ever read. A failed copy is logged and reported once, never
//! retried, and never stops the run. A source that already is its
//! destination (an earlier run's copy inside a source folder, or a manual
//! pick from the output folder) is left alone.
//!
//! ## Name collisions
//! Raw files from different cards can share a basename. The later copy
//! overwrites the earlier one; the materializer remembers which source wrote
//! each destination so the overwrite is reported instead of going unnoticed.
//! Copies to the same destination are serialized.

use crate::error::CopyError;
use crate::events::{CopyEvent, Event, EventSender};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Writes a copy of a file's contents
pub trait ByteCopier: Send + Sync {
    /// Copy `source` to `destination`, replacing it if present; returns bytes written
    fn copy(&self, source: &Path, destination: &Path) -> Result<u64, CopyError>;
}

/// Copier backed by `std::fs::copy`
///
/// Keeps the source's modification time on the copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopier;

impl ByteCopier for FsCopier {
    fn copy(&self, source: &Path, destination: &Path) -> Result<u64, CopyError> {
        if !source.is_file() {
            return Err(CopyError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        // fs::copy onto the same file truncates it to nothing
        if same_file(source, destination) {
            return Err(CopyError::SameFile {
                path: source.to_path_buf(),
            });
        }

        let bytes = fs::copy(source, destination).map_err(|e| CopyError::Io {
            source_path: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source: e,
        })?;

        if let Err(e) = keep_modified_time(source, destination) {
            warn!(
                destination = %destination.display(),
                error = %e,
                "Could not keep the original modification time"
            );
        }
        Ok(bytes)
    }
}

fn keep_modified_time(source: &Path, destination: &Path) -> io::Result<()> {
    let modified = fs::metadata(source)?.modified()?;
    File::options()
        .write(true)
        .open(destination)?
        .set_modified(modified)
}

/// Whether both paths lead to one file on disk
///
/// A path that does not exist never matches.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Result of materializing one raw file
#[derive(Debug)]
pub enum CopyOutcome {
    Copied {
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
    },
    /// Copied over a destination another source wrote earlier in this run
    Overwrote {
        source: PathBuf,
        destination: PathBuf,
        previous_source: PathBuf,
        bytes: u64,
    },
    /// The source already is the destination; nothing was written
    AlreadyInPlace {
        source: PathBuf,
        destination: PathBuf,
    },
    /// Dry run: nothing was written
    Skipped {
        source: PathBuf,
        destination: PathBuf,
    },
    Failed {
        source: PathBuf,
        destination: PathBuf,
        error: CopyError,
    },
}

/// Last source written to a destination
type Slot = Arc<Mutex<Option<PathBuf>>>;

/// Copies raw files into one output folder
pub struct Materializer {
    destination_dir: PathBuf,
    copier: Arc<dyn ByteCopier>,
    dry_run: bool,
    written: Mutex<HashMap<PathBuf, Slot>>,
}

impl Materializer {
    pub fn new(destination_dir: impl Into<PathBuf>, copier: Arc<dyn ByteCopier>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
            copier,
            dry_run: false,
            written: Mutex::new(HashMap::new()),
        }
    }

    /// Report what would be copied without writing anything
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Where a raw file ends up in the output folder
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        match source.file_name() {
            Some(name) => self.destination_dir.join(name),
            None => self.destination_dir.join(source),
        }
    }

    /// Copy one raw file, in a single attempt
    pub fn materialize(&self, source: &Path, events: &EventSender) -> CopyOutcome {
        let destination = self.destination_for(source);

        if self.dry_run {
            info!(source = %source.display(), destination = %destination.display(), "Dry run, not copying");
            return CopyOutcome::Skipped {
                source: source.to_path_buf(),
                destination,
            };
        }

        let slot = self.slot(&destination);
        let mut last_source = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if same_file(source, &destination) {
            info!(path = %destination.display(), "Already in the output folder, not copying");
            if last_source.is_none() {
                *last_source = Some(source.to_path_buf());
            }
            events.send(Event::Copy(CopyEvent::AlreadyInPlace {
                path: destination.clone(),
            }));
            return CopyOutcome::AlreadyInPlace {
                source: source.to_path_buf(),
                destination,
            };
        }

        match self.copier.copy(source, &destination) {
            Ok(bytes) => {
                let previous = last_source.replace(source.to_path_buf());
                match previous.filter(|p| p != source) {
                    Some(previous_source) => {
                        warn!(
                            source = %source.display(),
                            destination = %destination.display(),
                            previous_source = %previous_source.display(),
                            "Overwrote a raw file copied earlier in this run"
                        );
                        events.send(Event::Copy(CopyEvent::Overwrote {
                            source: source.to_path_buf(),
                            destination: destination.clone(),
                        }));
                        CopyOutcome::Overwrote {
                            source: source.to_path_buf(),
                            destination,
                            previous_source,
                            bytes,
                        }
                    }
                    None => {
                        info!(source = %source.display(), destination = %destination.display(), "Copied");
                        events.send(Event::Copy(CopyEvent::Copied {
                            source: source.to_path_buf(),
                            destination: destination.clone(),
                        }));
                        CopyOutcome::Copied {
                            source: source.to_path_buf(),
                            destination,
                            bytes,
                        }
                    }
                }
            }
            Err(e) => {
                error!(
                    source = %source.display(),
                    destination = %destination.display(),
                    error = %e,
                    "Error copying raw file"
                );
                events.send(Event::Copy(CopyEvent::Failed {
                    source: source.to_path_buf(),
                    message: e.to_string(),
                }));
                CopyOutcome::Failed {
                    source: source.to_path_buf(),
                    destination,
                    error: e,
                }
            }
        }
    }

    fn slot(&self, destination: &Path) -> Slot {
        let mut written = self
            .written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(written.entry(destination.to_path_buf()).or_default())
    }
}
