//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the matching pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Raw index build events
    Index(IndexEvent),
    /// Preview matching events
    Match(MatchEvent),
    /// Interactive disambiguation events
    Resolve(ResolveEvent),
    /// Copy events
    Copy(CopyEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while indexing raw files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexEvent {
    /// Indexing has started
    Started { roots: Vec<PathBuf> },
    /// A source root has been walked and its raw files counted
    RootWalked { root: PathBuf, raw_files: usize },
    /// Progress update while reading metadata
    Progress(IndexProgress),
    /// A raw file was left out of the index
    Skipped { path: PathBuf, reason: String },
    /// A source root finished contributing to the index
    RootCompleted { root: PathBuf, indexed: usize },
    /// Indexing completed
    Completed {
        identity_keys: usize,
        raw_files: usize,
    },
}

/// Progress information while indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexProgress {
    /// Raw files inspected so far
    pub completed: usize,
    /// Raw files inspected so far that came from the metadata cache
    pub cache_hits: usize,
    /// File being inspected
    pub current_path: PathBuf,
}

/// Events while matching previews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// Matching has started
    Started { total_previews: usize },
    /// A preview was evaluated
    Evaluated {
        preview: PathBuf,
        completed: usize,
        total: usize,
    },
    /// Matching completed
    Completed {
        matched: usize,
        deferred: usize,
        unmatched: usize,
    },
}

/// Events during interactive disambiguation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolveEvent {
    /// Disambiguation has started
    Started { total_cases: usize },
    /// A case was resolved by the user
    Resolved { preview: PathBuf, raw: PathBuf },
    /// Disambiguation completed
    Completed { resolved: usize },
}

/// Events while copying raw files to the output folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CopyEvent {
    /// A raw file was copied
    Copied {
        source: PathBuf,
        destination: PathBuf,
    },
    /// An existing destination written earlier in the run was overwritten
    Overwrote {
        source: PathBuf,
        destination: PathBuf,
    },
    /// The raw file already is the destination; nothing was written
    AlreadyInPlace { path: PathBuf },
    /// Copying failed
    Failed { source: PathBuf, message: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Indexing,
    Matching,
    Resolving,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Previews considered
    pub total_previews: usize,
    /// Previews matched without human input
    pub matched: usize,
    /// Deferred previews settled by the user
    pub resolved: usize,
    /// Previews with no usable raw file
    pub unmatched: usize,
    /// Deferred previews left open because the prompt stopped answering
    pub unresolved: usize,
    /// Copies that failed
    pub copy_failures: usize,
    /// Matches not copied because of a dry run
    pub skipped: usize,
    /// Copies that overwrote a file written earlier in the same run
    pub collisions: usize,
    /// Capture times answered without reading the file
    pub cache_hits: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Indexing => write!(f, "Indexing raw files"),
            PipelinePhase::Matching => write!(f, "Matching previews"),
            PipelinePhase::Resolving => write!(f, "Resolving ambiguous matches"),
        }
    }
}
