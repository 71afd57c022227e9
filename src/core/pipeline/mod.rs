//! # Pipeline Module
//!
//! Orchestrates a full matching run.
//!
//! ## Pipeline Stages
//! 1. **Setup** - Validate folders, create the output folder and run log
//! 2. **Index** - Read every raw file's identity and capture time (parallel)
//! 3. **Match** - Resolve each preview against the index and copy unique
//!    matches right away (parallel)
//! 4. **Resolve** - Ask the user about every deferred preview (sequential)
//!
//! Each stage starts only after the previous one has fully finished.
//!
//! ## Parallelism
//! Both parallel stages run inside one rayon pool sized by
//! `MatchConfig::workers`, which bounds how many files are open at once.

mod config;
mod executor;

pub use config::{MatchConfig, DEFAULT_WORKERS};
pub use executor::{Pipeline, PipelineBuilder, PipelineResult};
