//! # Raw Matcher
//!
//! Recovers the full-resolution raw originals of a hand-picked set of preview
//! photos scattered across memory cards.
//!
//! ## Core Philosophy
//! - **Never touch the sources** - raw files are copied, never moved or deleted
//! - **Never guess** - ambiguous matches are always handed to a human
//! - **Never drop silently** - every unmatched preview ends up in the run log
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - Indexing, matching, disambiguation and copying
//! - `events` - Event-driven progress reporting
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{RawMatchError, Result};

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// This should be called by the application entry point. When `log_file` is
/// given, diagnostics are appended to it (one writer lock per line, so
/// parallel workers never interleave); otherwise they go to stderr.
pub fn init_tracing(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .expect("Failed to set global default tracing subscriber");
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .expect("Failed to set global default tracing subscriber");
        }
    }

    Ok(())
}
