//! # Metadata Module
//!
//! Reads the capture time embedded in photo files.
//!
//! ## Extracted Fields
//! Only `DateTimeOriginal` (the moment the shutter fired). Raw formats
//! such as ARW, NEF and DNG are TIFF containers and carry the same EXIF
//! block as the JPEG previews, so one reader serves both sides of the join.
//!
//! EXIF times carry no zone. They are kept as naive local times and only
//! ever compared with each other.

use crate::error::MetadataError;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Moment of capture as recorded by the camera
pub type CaptureTime = NaiveDateTime;

/// EXIF date format: "YYYY:MM:DD HH:MM:SS"
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Source of capture timestamps
///
/// Implement this trait to plug in another metadata library (or a fixed
/// table in tests).
pub trait MetadataReader: Send + Sync {
    /// Read the capture time of a file
    fn capture_time(&self, path: &Path) -> Result<CaptureTime, MetadataError>;
}

/// Reads `DateTimeOriginal` with kamadak-exif
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifReader;

impl ExifReader {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataReader for ExifReader {
    fn capture_time(&self, path: &Path) -> Result<CaptureTime, MetadataError> {
        let file = File::open(path).map_err(|source| MetadataError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut bufreader = BufReader::new(file);
        let exif = Reader::new()
            .read_from_container(&mut bufreader)
            .map_err(|e| MetadataError::Exif {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let field = exif
            .get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .ok_or_else(|| MetadataError::MissingCaptureTime {
                path: path.to_path_buf(),
            })?;

        let raw = match field.value {
            Value::Ascii(ref vec) => vec
                .first()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
        .ok_or_else(|| MetadataError::MissingCaptureTime {
            path: path.to_path_buf(),
        })?;

        parse_exif_datetime(&raw).ok_or_else(|| MetadataError::InvalidCaptureTime {
            path: path.to_path_buf(),
            value: raw,
        })
    }
}

/// Parse an EXIF date string, tolerating the NUL padding some cameras write
pub fn parse_exif_datetime(value: &str) -> Option<CaptureTime> {
    let trimmed = value.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(trimmed, EXIF_DATETIME_FORMAT).ok()
}
