//! Shared fixtures for integration tests.

#![allow(dead_code)]

use raw_matcher::core::resolver::{DisambiguationCase, Prompt};
use raw_matcher::error::PromptError;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Little-endian TIFF carrying only `DateTimeOriginal`, followed by `payload`
///
/// Readable by the EXIF reader whatever the file extension, so it stands in
/// for both raw files and previews.
pub fn tiff_with_capture_time(value: &str, payload: &[u8]) -> Vec<u8> {
    let mut ascii = value.as_bytes().to_vec();
    ascii.push(0);

    let mut buf = Vec::new();
    buf.extend_from_slice(b"II");
    buf.extend_from_slice(&42u16.to_le_bytes());
    buf.extend_from_slice(&8u32.to_le_bytes());
    // IFD0: ExifIFDPointer -> 26
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&0x8769u16.to_le_bytes());
    buf.extend_from_slice(&4u16.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&26u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    // Exif IFD: DateTimeOriginal -> 44
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&0x9003u16.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
    buf.extend_from_slice(&44u32.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    buf.extend_from_slice(&ascii);
    buf.extend_from_slice(payload);
    buf
}

/// Write a photo shot at `time` ("YYYY:MM:DD HH:MM:SS") into `dir`
pub fn photo(dir: &Path, name: &str, time: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let payload = format!("{}/{}", dir.display(), name);
    fs::write(&path, tiff_with_capture_time(time, payload.as_bytes())).unwrap();
    path
}

/// A file with the right name but no EXIF block
pub fn unreadable(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, b"truncated raw").unwrap();
    path
}

/// Prompt replaying canned answers and recording what it was shown
#[derive(Default)]
pub struct ScriptedPrompt {
    choices: VecDeque<String>,
    paths: VecDeque<String>,
    pub presented: Vec<DisambiguationCase>,
    pub rejections: usize,
}

impl ScriptedPrompt {
    pub fn new(choices: &[&str]) -> Self {
        Self {
            choices: choices.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_paths(mut self, paths: &[&str]) -> Self {
        self.paths = paths.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl Prompt for ScriptedPrompt {
    fn present(&mut self, case: &DisambiguationCase) -> Result<(), PromptError> {
        self.presented.push(case.clone());
        Ok(())
    }

    fn read_choice(&mut self) -> Result<String, PromptError> {
        self.choices.pop_front().ok_or(PromptError::InputClosed)
    }

    fn read_manual_path(&mut self) -> Result<String, PromptError> {
        self.paths.pop_front().ok_or(PromptError::InputClosed)
    }

    fn reject(&mut self, _message: &str) -> Result<(), PromptError> {
        self.rejections += 1;
        Ok(())
    }
}
