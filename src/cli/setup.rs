//! Interactive run setup.
//!
//! Fills in whatever the command line and config file left open, then shows
//! every choice and waits for a final yes before anything is touched.

use super::prompt::read_answer;
use super::table;
use console::{style, Term};
use raw_matcher::core::index::{BatchPlan, DEFAULT_AVG_RAW_SIZE_BYTES};
use raw_matcher::core::pipeline::MatchConfig;
use raw_matcher::error::PromptError;
use std::path::PathBuf;

pub struct Setup<'a> {
    term: &'a Term,
}

impl<'a> Setup<'a> {
    pub fn new(term: &'a Term) -> Self {
        Self { term }
    }

    /// Ask for every missing folder; with `ask_tuning`, also for workers and batch size
    pub fn complete(&self, config: &mut MatchConfig, ask_tuning: bool) -> Result<(), PromptError> {
        if ask_tuning {
            config.workers = self.ask_number(
                "Enter the number of workers to use for parallel processing",
                config.workers,
            )?;
        }

        if config.preview_folder.is_none() {
            let answer = self.ask("Enter the path to the folder containing the selected previews", None)?;
            config.preview_folder = Some(PathBuf::from(answer));
        }

        if config.source_folders.is_empty() {
            let answer = self.ask("Enter the paths to the card folders (separated by space)", None)?;
            config.source_folders = answer.split_whitespace().map(PathBuf::from).collect();
        }

        if config.output_folder.is_none() {
            let answer = self.ask("Enter the path to the output folder for raw files", None)?;
            config.output_folder = Some(PathBuf::from(answer));
        }

        if ask_tuning {
            let default = config
                .batch_size
                .unwrap_or_else(|| BatchPlan::default().batch_size);
            loop {
                let size = self.ask_number(
                    "Enter the batch size (number of files) to load into memory",
                    default,
                )?;
                let plan = BatchPlan::with_batch_size(size, DEFAULT_AVG_RAW_SIZE_BYTES);
                self.term.write_line(&format!(
                    "\nEstimated memory usage for batch size {}: {:.2} GB",
                    plan.batch_size,
                    plan.estimated_memory_gb()
                ))?;
                if self.yes("Do you want to proceed with this batch size? (y/n): ")? {
                    config.batch_size = Some(plan.batch_size);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Show every choice and ask for the final go-ahead
    pub fn confirm(&self, config: &MatchConfig) -> Result<bool, PromptError> {
        let folder = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        let sources = config
            .source_folders
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p.display()))
            .collect::<Vec<_>>()
            .join("\n");
        let batch = match config.batch_plan() {
            Some(plan) => format!(
                "{} (about {:.2} GB)",
                plan.batch_size,
                plan.estimated_memory_gb()
            ),
            None => "all at once".to_string(),
        };

        let rows = vec![
            vec!["Folder containing selected previews".to_string(), folder(&config.preview_folder)],
            vec!["Card folders".to_string(), sources],
            vec!["Output folder for raw files".to_string(), folder(&config.output_folder)],
            vec!["Number of workers".to_string(), config.workers.to_string()],
            vec!["Batch size".to_string(), batch],
            vec!["Time tolerance".to_string(), format!("{} seconds", config.tolerance_secs)],
            vec!["Dry run".to_string(), if config.dry_run { "yes" } else { "no" }.to_string()],
        ];

        self.term.write_line("")?;
        self.term
            .write_line(&style("Summary of choices:").bold().to_string())?;
        for line in table::render(&["", ""], &rows) {
            self.term.write_line(&line)?;
        }

        self.yes("\nDo you confirm these choices? (y/n): ")
    }

    /// Ask until the user confirms the answer; an empty answer takes `default`
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String, PromptError> {
        let question = match default {
            Some(d) => format!("{} (default: {}): ", question, d),
            None => format!("{}: ", question),
        };

        loop {
            self.term
                .write_line(&style("·".repeat(60)).dim().to_string())?;
            self.term.write_str(&question)?;
            let mut value = read_answer()?.trim().to_string();
            if value.is_empty() {
                match default {
                    Some(d) => value = d.to_string(),
                    None => continue,
                }
            }

            if self.yes(&format!("You entered: '{}'. Confirm? (y/n): ", value))? {
                return Ok(value);
            }
        }
    }

    fn ask_number(&self, question: &str, default: usize) -> Result<usize, PromptError> {
        loop {
            let answer = self.ask(question, Some(&default.to_string()))?;
            match answer.parse::<usize>() {
                Ok(n) if n > 0 => return Ok(n),
                _ => self
                    .term
                    .write_line(&style("Please enter a whole number above zero.").yellow().to_string())?,
            }
        }
    }

    fn yes(&self, question: &str) -> Result<bool, PromptError> {
        self.term.write_str(question)?;
        Ok(read_answer()?.trim().eq_ignore_ascii_case("y"))
    }
}
