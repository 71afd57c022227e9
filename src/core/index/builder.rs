//! Parallel raw index construction.

use super::{BatchPlan, RawIndex, RawRecord};
use crate::core::cache::MetadataCache;
use crate::core::identity::IdentityPattern;
use crate::core::scanner::{ExtensionFilter, FileWalker};
use crate::events::{Event, EventSender, IndexEvent, IndexProgress};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of an index build
#[derive(Debug, Default)]
pub struct IndexReport {
    /// The merged index
    pub index: RawIndex,
    /// Raw files found by the walk
    pub raw_files_seen: usize,
    /// Raw files left out because their name has no identity key
    pub skipped_no_identity: usize,
    /// Raw files left out because their capture time is unreadable
    pub skipped_no_capture_time: usize,
    /// Inspections answered without reading the file
    pub cache_hits: usize,
    /// Walk problems (missing roots, unreadable directories)
    pub errors: Vec<String>,
}

/// A root after walking, before inspection
struct WalkedRoot {
    root: PathBuf,
    files: Vec<PathBuf>,
}

enum Inspection {
    Indexed(RawRecord),
    NoIdentity,
    NoCaptureTime,
}

struct Counters {
    completed: AtomicUsize,
    cache_hits: AtomicUsize,
    no_identity: AtomicUsize,
    no_capture_time: AtomicUsize,
}

/// Builds a `RawIndex` from one or more source roots
///
/// Runs on the current rayon pool; install it in a sized pool to bound the
/// number of files open at once.
pub struct RawIndexBuilder {
    walker: Arc<dyn FileWalker>,
    filter: ExtensionFilter,
    identity: IdentityPattern,
    batch: Option<BatchPlan>,
}

impl RawIndexBuilder {
    pub fn new(walker: Arc<dyn FileWalker>, filter: ExtensionFilter, identity: IdentityPattern) -> Self {
        Self {
            walker,
            filter,
            identity,
            batch: None,
        }
    }

    /// Inspect at most `plan.batch_size` raw files at a time
    pub fn batch(mut self, plan: Option<BatchPlan>) -> Self {
        self.batch = plan;
        self
    }

    /// Walk every root, read identities and capture times, and merge the result
    pub fn build(&self, roots: &[PathBuf], cache: &MetadataCache, events: &EventSender) -> IndexReport {
        events.send(Event::Index(IndexEvent::Started {
            roots: roots.to_vec(),
        }));

        let mut errors = Vec::new();
        let walked: Vec<WalkedRoot> = roots
            .par_iter()
            .map(|root| self.walk_root(root, events))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|(walked, mut root_errors)| {
                errors.append(&mut root_errors);
                walked
            })
            .collect();

        let raw_files_seen = walked.iter().map(|w| w.files.len()).sum();
        let counters = Counters {
            completed: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            no_identity: AtomicUsize::new(0),
            no_capture_time: AtomicUsize::new(0),
        };

        let index = match self.batch {
            // Roots one after another, each in fixed-size chunks
            Some(plan) => walked
                .iter()
                .map(|w| {
                    let partial = w
                        .files
                        .chunks(plan.batch_size)
                        .map(|chunk| self.index_files(chunk, cache, events, &counters))
                        .fold(RawIndex::new(), RawIndex::merge);
                    Self::root_completed(w, &partial, events);
                    partial
                })
                .fold(RawIndex::new(), RawIndex::merge),
            None => walked
                .par_iter()
                .map(|w| {
                    let partial = self.index_files(&w.files, cache, events, &counters);
                    Self::root_completed(w, &partial, events);
                    partial
                })
                .reduce(RawIndex::new, RawIndex::merge),
        };

        events.send(Event::Index(IndexEvent::Completed {
            identity_keys: index.key_count(),
            raw_files: index.record_count(),
        }));

        let report = IndexReport {
            raw_files_seen,
            skipped_no_identity: counters.no_identity.load(Ordering::SeqCst),
            skipped_no_capture_time: counters.no_capture_time.load(Ordering::SeqCst),
            cache_hits: counters.cache_hits.load(Ordering::SeqCst),
            errors,
            index,
        };

        info!(
            raw_files = report.raw_files_seen,
            indexed = report.index.record_count(),
            identity_keys = report.index.key_count(),
            skipped_no_identity = report.skipped_no_identity,
            skipped_no_capture_time = report.skipped_no_capture_time,
            "Raw index built"
        );

        report
    }

    fn walk_root(&self, root: &Path, events: &EventSender) -> (Option<WalkedRoot>, Vec<String>) {
        match self.walker.walk(root, &self.filter) {
            Ok(result) => {
                let errors: Vec<String> = result
                    .errors
                    .iter()
                    .map(|e| {
                        warn!(root = %root.display(), error = %e, "Problem while walking source folder");
                        e.to_string()
                    })
                    .collect();

                events.send(Event::Index(IndexEvent::RootWalked {
                    root: root.to_path_buf(),
                    raw_files: result.files.len(),
                }));

                (
                    Some(WalkedRoot {
                        root: root.to_path_buf(),
                        files: result.files,
                    }),
                    errors,
                )
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Source folder could not be walked");
                (None, vec![e.to_string()])
            }
        }
    }

    fn index_files(
        &self,
        files: &[PathBuf],
        cache: &MetadataCache,
        events: &EventSender,
        counters: &Counters,
    ) -> RawIndex {
        files
            .par_iter()
            .filter_map(|path| match self.inspect(path, cache, events, counters) {
                Inspection::Indexed(record) => Some(record),
                Inspection::NoIdentity => {
                    counters.no_identity.fetch_add(1, Ordering::SeqCst);
                    None
                }
                Inspection::NoCaptureTime => {
                    counters.no_capture_time.fetch_add(1, Ordering::SeqCst);
                    None
                }
            })
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    fn inspect(
        &self,
        path: &Path,
        cache: &MetadataCache,
        events: &EventSender,
        counters: &Counters,
    ) -> Inspection {
        let identity_key = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| self.identity.extract(name));

        let inspection = match identity_key {
            None => {
                warn!(path = %path.display(), "Raw file name has no identity key, skipping");
                events.send(Event::Index(IndexEvent::Skipped {
                    path: path.to_path_buf(),
                    reason: "no identity key in file name".to_string(),
                }));
                Inspection::NoIdentity
            }
            Some(identity_key) => {
                let (capture_time, origin) = cache.lookup(path);
                if origin.is_hit() {
                    counters.cache_hits.fetch_add(1, Ordering::SeqCst);
                }
                match capture_time {
                    Some(captured_at) => Inspection::Indexed(RawRecord {
                        path: path.to_path_buf(),
                        identity_key,
                        captured_at,
                    }),
                    None => {
                        warn!(path = %path.display(), "Raw file has no readable capture time, skipping");
                        events.send(Event::Index(IndexEvent::Skipped {
                            path: path.to_path_buf(),
                            reason: "capture time unreadable".to_string(),
                        }));
                        Inspection::NoCaptureTime
                    }
                }
            }
        };

        let completed = counters.completed.fetch_add(1, Ordering::SeqCst) + 1;
        events.send(Event::Index(IndexEvent::Progress(IndexProgress {
            completed,
            cache_hits: counters.cache_hits.load(Ordering::SeqCst),
            current_path: path.to_path_buf(),
        })));

        inspection
    }

    fn root_completed(walked: &WalkedRoot, partial: &RawIndex, events: &EventSender) {
        info!(
            root = %walked.root.display(),
            raw_files = walked.files.len(),
            indexed = partial.record_count(),
            "Source folder indexed"
        );
        events.send(Event::Index(IndexEvent::RootCompleted {
            root: walked.root.clone(),
            indexed: partial.record_count(),
        }));
    }
}
