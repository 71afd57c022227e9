//! # Resolver Module
//!
//! Hands every deferred case to a human, one at a time.
//!
//! The resolver never picks a candidate on its own, however clear the
//! ranking: a wrong raw file copied into the output cannot be told apart
//! from a right one afterwards. Invalid answers are rejected and the case is
//! presented again until a valid choice is made.

use crate::core::matcher::{Candidate, SelectedPreview};
use crate::error::PromptError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A preview whose identity key is shared by several raw files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisambiguationCase {
    pub preview: SelectedPreview,
    /// Nearest first
    pub candidates: Vec<Candidate>,
}

/// How the human settled a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    /// 1-based position in the ranked candidate list
    Candidate(usize),
    /// A path typed in by hand
    Manual(PathBuf),
}

/// A settled case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub preview: SelectedPreview,
    pub raw_path: PathBuf,
    pub choice: Choice,
}

/// The human on the other side of the disambiguation phase
///
/// Implemented by the terminal UI; tests script the answers.
pub trait Prompt {
    /// Show the preview and its ranked candidates
    fn present(&mut self, case: &DisambiguationCase) -> Result<(), PromptError>;

    /// Read a candidate number, or "0" to type a path
    fn read_choice(&mut self) -> Result<String, PromptError>;

    /// Read a path typed in by hand
    fn read_manual_path(&mut self) -> Result<String, PromptError>;

    /// Tell the human their answer was not accepted
    fn reject(&mut self, message: &str) -> Result<(), PromptError>;
}

/// Sequential human-in-the-loop disambiguation
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver;

impl Resolver {
    pub fn new() -> Self {
        Self
    }

    /// Ask until the case is settled
    ///
    /// Only a failing or closed prompt ends the loop without a resolution.
    pub fn resolve(
        &self,
        case: &DisambiguationCase,
        prompt: &mut dyn Prompt,
    ) -> Result<Resolution, PromptError> {
        loop {
            prompt.present(case)?;
            let answer = prompt.read_choice()?;

            match Self::parse_choice(answer.trim(), case.candidates.len()) {
                Some(0) => {
                    let typed = prompt.read_manual_path()?;
                    let path = PathBuf::from(typed.trim());
                    if Self::is_existing_file(&path) {
                        info!(
                            preview = %case.preview.file_name,
                            raw = %path.display(),
                            "Raw file chosen by path"
                        );
                        return Ok(Resolution {
                            preview: case.preview.clone(),
                            raw_path: path.clone(),
                            choice: Choice::Manual(path),
                        });
                    }
                    debug!(path = %path.display(), "Typed path does not exist");
                    prompt.reject("File does not exist. Please try again.")?;
                }
                Some(n) => {
                    let candidate = &case.candidates[n - 1];
                    info!(
                        preview = %case.preview.file_name,
                        raw = %candidate.path.display(),
                        delta_seconds = candidate.delta_seconds,
                        "Raw file chosen from candidates"
                    );
                    return Ok(Resolution {
                        preview: case.preview.clone(),
                        raw_path: candidate.path.clone(),
                        choice: Choice::Candidate(n),
                    });
                }
                None => {
                    debug!(answer = %answer.trim(), "Invalid disambiguation answer");
                    prompt.reject("Invalid choice. Please try again.")?;
                }
            }
        }
    }

    /// `Some(0)` for manual entry, `Some(n)` for a listed candidate
    fn parse_choice(answer: &str, candidates: usize) -> Option<usize> {
        if answer.is_empty() || !answer.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: usize = answer.parse().ok()?;
        (n <= candidates).then_some(n)
    }

    fn is_existing_file(path: &Path) -> bool {
        !path.as_os_str().is_empty() && path.is_file()
    }
}
