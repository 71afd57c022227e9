//! # Core Module
//!
//! The UI-agnostic matching engine.
//!
//! ## Modules
//! - `identity` - Derives the shot-number key from a file name
//! - `metadata` - Reads capture times from EXIF
//! - `cache` - Memoizes (and optionally persists) capture times
//! - `scanner` - Discovers raw files and previews
//! - `index` - Builds the identity-key to raw-file index
//! - `matcher` - Resolves previews against the index
//! - `resolver` - Lets the user settle ambiguous previews
//! - `materializer` - Copies chosen raw files to the output folder
//! - `reporter` - Run log and per-preview report
//! - `pipeline` - Orchestrates the full workflow

pub mod cache;
pub mod identity;
pub mod index;
pub mod materializer;
pub mod matcher;
pub mod metadata;
pub mod pipeline;
pub mod reporter;
pub mod resolver;
pub mod scanner;

// Re-export commonly used types
pub use index::{RawIndex, RawRecord};
pub use matcher::{Candidate, MatchOutcome, SelectedPreview, UnmatchedReason};
pub use pipeline::{MatchConfig, Pipeline, PipelineResult};
pub use resolver::{DisambiguationCase, Prompt};
