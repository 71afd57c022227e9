//! Terminal implementation of the disambiguation prompt.

use super::progress::Progress;
use super::table;
use console::{style, Term};
use raw_matcher::core::resolver::{DisambiguationCase, Prompt};
use raw_matcher::error::PromptError;
use std::io::BufRead;

/// Read one line from stdin, without its line ending
///
/// End of input is an error rather than an empty answer, so a closed stdin
/// cannot make a re-prompt loop spin forever.
pub fn read_answer() -> Result<String, PromptError> {
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(PromptError::InputClosed);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Asks the user on the terminal
pub struct TermPrompt {
    term: Term,
    progress: Option<Progress>,
}

impl TermPrompt {
    pub fn new(term: Term, progress: Option<Progress>) -> Self {
        Self { term, progress }
    }
}

impl Prompt for TermPrompt {
    fn present(&mut self, case: &DisambiguationCase) -> Result<(), PromptError> {
        // Bars must be gone before the first question is printed
        if let Some(progress) = self.progress.take() {
            progress.clear();
        }

        let preview = &case.preview;
        let shot_time = preview
            .captured_at
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        self.term.write_line("")?;
        self.term.write_line(&format!(
            "{} {}, Path: {}, Shooting time: {}",
            style("Preview:").bold(),
            style(&preview.file_name).cyan(),
            preview.path.display(),
            shot_time
        ))?;
        self.term.write_line("")?;
        self.term.write_line("Multiple similar raw files found:")?;

        let rows: Vec<Vec<String>> = case
            .candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                vec![
                    (i + 1).to_string(),
                    c.path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    c.path.display().to_string(),
                    c.captured_at.to_string(),
                    format!("{} seconds", c.delta_seconds),
                ]
            })
            .collect();

        for line in table::render(
            &["Option", "Name", "Path", "Shooting Time", "Time Difference"],
            &rows,
        ) {
            self.term.write_line(&line)?;
        }
        Ok(())
    }

    fn read_choice(&mut self) -> Result<String, PromptError> {
        self.term
            .write_str("\nEnter the number of the correct file (or '0' to enter manually): ")?;
        read_answer()
    }

    fn read_manual_path(&mut self) -> Result<String, PromptError> {
        self.term.write_str("Enter the full path to the correct file: ")?;
        read_answer()
    }

    fn reject(&mut self, message: &str) -> Result<(), PromptError> {
        self.term.write_line(&style(message).yellow().to_string())?;
        Ok(())
    }
}
