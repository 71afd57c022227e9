//! # Error Module
//!
//! User-friendly error types for the raw matcher.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Contain per-file failures** - only setup problems abort a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum RawMatchError {
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fatal problems detected before any work starts
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Preview folder not found: {path}")]
    PreviewFolderNotFound { path: PathBuf },

    #[error("Source folder not found: {path}")]
    SourceFolderNotFound { path: PathBuf },

    #[error("No source folders were given")]
    NoSourceFolders,

    #[error("No {name} was given")]
    MissingSetting { name: &'static str },

    #[error("Cannot create output folder {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open run log {path}: {source}")]
    RunLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid worker count: {value} (must be at least 1)")]
    InvalidWorkerCount { value: usize },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}

/// Errors that occur while walking source folders
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while reading capture metadata
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No readable EXIF block in {path}: {reason}")]
    Exif { path: PathBuf, reason: String },

    #[error("No capture time recorded in {path}")]
    MissingCaptureTime { path: PathBuf },

    #[error("Unparseable capture time '{value}' in {path}")]
    InvalidCaptureTime { path: PathBuf, value: String },
}

/// Errors that occur with the persistent metadata cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Cache corruption detected at {path}. Delete this file and try again.")]
    Corrupted { path: PathBuf },
}

/// Errors that occur while copying a raw file to the output folder
#[derive(Error, Debug)]
pub enum CopyError {
    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error("Refusing to copy {path} onto itself")]
    SameFile { path: PathBuf },

    #[error("Error copying {source_path} to {destination}: {source}")]
    Io {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors talking to the human during disambiguation
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to talk to the terminal: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input was closed before a choice was made")]
    InputClosed,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, RawMatchError>;
