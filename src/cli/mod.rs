//! # CLI Module
//!
//! Command-line interface for the raw matcher.
//!
//! ## Usage
//! ```bash
//! # Fully interactive
//! raw-match
//!
//! # Everything on the command line
//! raw-match -p ~/Pictures/keepers -s /Volumes/CARD1 /Volumes/CARD2 -d ~/Pictures/raw --yes
//!
//! # From a config file, with a per-preview report
//! raw-match --config raw-match.toml --report report.csv
//!
//! # JSON summary for scripting
//! raw-match --config raw-match.toml --yes --output json
//! ```

mod progress;
mod prompt;
mod setup;
mod table;

use clap::{Parser, ValueEnum};
use console::{style, Term};
use progress::Progress;
use prompt::TermPrompt;
use raw_matcher::core::cache::{CacheBackend, SqliteCache};
use raw_matcher::core::pipeline::{MatchConfig, Pipeline, PipelineResult};
use raw_matcher::core::reporter::export_csv;
use raw_matcher::error::{RawMatchError, Result, SetupError};
use raw_matcher::events::EventChannel;
use setup::Setup;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Diagnostic log written inside the output folder unless --log-file is given
const DIAGNOSTIC_LOG_FILE_NAME: &str = "raw-match.log";

/// Raw Matcher - Recover the raw originals of the previews you kept
#[derive(Parser, Debug)]
#[command(name = "raw-match")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder containing the selected previews
    #[arg(short, long, value_name = "DIR")]
    previews: Option<PathBuf>,

    /// Card folders to search for raw files (recursively)
    #[arg(short, long, value_name = "DIR", num_args = 1..)]
    sources: Vec<PathBuf>,

    /// Output folder for the matched raw files
    #[arg(short, long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Largest capture-time difference in seconds for shared shot numbers
    #[arg(short, long, value_name = "SECS")]
    tolerance: Option<u64>,

    /// Inspect at most this many raw files at a time
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// TOML config file; command-line flags override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raw file extension
    #[arg(long, value_name = "EXT")]
    raw_ext: Option<String>,

    /// File-name prefix before the shot number (repeatable)
    #[arg(long = "prefix", value_name = "PREFIX")]
    prefixes: Vec<String>,

    /// Search hidden folders on the cards
    #[arg(long)]
    include_hidden: bool,

    /// Match and report without copying anything
    #[arg(long)]
    dry_run: bool,

    /// Skip the final confirmation
    #[arg(short, long)]
    yes: bool,

    /// Write a per-preview CSV report
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Persistent capture-time cache database
    #[arg(long, value_name = "FILE", conflicts_with = "no_cache")]
    cache: Option<PathBuf>,

    /// Keep capture times in the default cache location
    #[arg(long, conflicts_with_all = ["cache", "no_cache"])]
    use_cache: bool,

    /// Ignore any cache set in the config file
    #[arg(long)]
    no_cache: bool,

    /// Diagnostic log file (default: <dest>/raw-match.log)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Verbose progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

impl Cli {
    /// Nothing that decides the run was given up front
    fn is_bare(&self) -> bool {
        self.config.is_none()
            && self.previews.is_none()
            && self.sources.is_empty()
            && self.dest.is_none()
    }

    /// Config file values with command-line flags on top
    fn into_config(self) -> Result<(MatchConfig, Options)> {
        let mut config = match &self.config {
            Some(path) => MatchConfig::from_file(path)?,
            None => MatchConfig::default(),
        };

        let bare = self.is_bare();
        if let Some(previews) = self.previews {
            config.preview_folder = Some(previews);
        }
        if !self.sources.is_empty() {
            config.source_folders = self.sources;
        }
        if let Some(dest) = self.dest {
            config.output_folder = Some(dest);
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance_secs = tolerance;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = Some(batch_size);
        }
        if let Some(ext) = self.raw_ext {
            config.raw_extension = ext;
        }
        if !self.prefixes.is_empty() {
            config.identity_prefixes = self.prefixes;
        }
        config.include_hidden |= self.include_hidden;
        config.dry_run |= self.dry_run;

        if self.no_cache {
            config.cache_path = None;
        } else if let Some(cache) = self.cache {
            config.cache_path = Some(cache);
        } else if self.use_cache {
            config.cache_path = Some(SqliteCache::default_path());
        }

        let options = Options {
            ask_tuning: bare && self.workers.is_none() && self.batch_size.is_none(),
            yes: self.yes,
            report: self.report,
            output: self.output,
            log_file: self.log_file,
            verbose: self.verbose,
        };
        Ok((config, options))
    }
}

/// Flags that shape the session rather than the run
struct Options {
    ask_tuning: bool,
    yes: bool,
    report: Option<PathBuf>,
    output: OutputFormat,
    log_file: Option<PathBuf>,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let (mut config, options) = Cli::parse().into_config()?;
    let term = Term::stderr();

    if options.output == OutputFormat::Pretty {
        term.write_line(&format!(
            "{} {}",
            style("Raw Matcher").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
    }

    let setup = Setup::new(&term);
    setup.complete(&mut config, options.ask_tuning)?;
    absolutize(&mut config);

    if !options.yes && !setup.confirm(&config)? {
        term.write_line("Operation cancelled.").ok();
        return Ok(());
    }

    let output_folder = prepare_output(&config)?;
    let log_file = options
        .log_file
        .clone()
        .unwrap_or_else(|| output_folder.join(DIAGNOSTIC_LOG_FILE_NAME));
    if let Err(e) = raw_matcher::init_tracing(Some(&log_file)) {
        term.write_line(&format!(
            "{} cannot write {} ({}), logging to the terminal",
            style("warning:").yellow(),
            log_file.display(),
            e
        ))
        .ok();
        raw_matcher::init_tracing(None).ok();
    }

    let mut builder = Pipeline::builder(config.clone());
    if let Some(cache_path) = &config.cache_path {
        let cache: Arc<dyn CacheBackend> = Arc::new(SqliteCache::open(cache_path)?);
        builder = builder.cache_backend(cache);
    }
    let pipeline = builder.build();

    let progress = match options.output {
        OutputFormat::Pretty => Progress::new(),
        OutputFormat::Json => Progress::hidden(),
    };
    let (sender, receiver) = EventChannel::new();
    let event_thread = progress.spawn(receiver, options.verbose);

    let mut prompt = TermPrompt::new(term.clone(), Some(progress));
    let result = pipeline.run_with_events(&mut prompt, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let mut result = result?;

    if let Some(report) = &options.report {
        write_report(report, &result)?;
    }

    match options.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, &log_file, options.report.as_deref()),
        OutputFormat::Json => print_json_results(&result),
    }

    match result.interrupted.take() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Check every setting, then create the output folder
///
/// Nothing is written to disk unless the whole configuration is usable.
fn prepare_output(config: &MatchConfig) -> Result<PathBuf> {
    config.validate()?;
    let output_folder = config
        .output_folder
        .clone()
        .ok_or(SetupError::MissingSetting {
            name: "output folder",
        })?;
    fs::create_dir_all(&output_folder).map_err(|e| SetupError::OutputDirectory {
        path: output_folder.clone(),
        source: e,
    })?;
    Ok(output_folder)
}

/// Relative paths are taken from the current directory
fn absolutize(config: &mut MatchConfig) {
    let absolute = |p: &Path| std::path::absolute(p).unwrap_or_else(|_| p.to_path_buf());

    config.preview_folder = config.preview_folder.as_deref().map(absolute);
    config.output_folder = config.output_folder.as_deref().map(absolute);
    config.source_folders = config.source_folders.iter().map(|p| absolute(p)).collect();
}

fn write_report(path: &Path, result: &PipelineResult) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| RawMatchError::Config(format!("cannot create {}: {}", path.display(), e)))?;
    export_csv(&result.reports, BufWriter::new(file))
        .map_err(|e| RawMatchError::Config(format!("cannot write {}: {}", path.display(), e)))
}

fn print_pretty_results(term: &Term, result: &PipelineResult, log_file: &Path, report: Option<&Path>) {
    let summary = &result.summary;

    term.write_line("").ok();
    term.write_line(&format!(
        "{} Completed in {:.2}s",
        style("✓").green().bold(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!("  {} previews considered", style(summary.total_previews).cyan()))
        .ok();
    term.write_line(&format!("  {} matched automatically", style(summary.matched).cyan()))
        .ok();
    term.write_line(&format!("  {} resolved by you", style(summary.resolved).cyan()))
        .ok();

    let unmatched = style(summary.unmatched);
    term.write_line(&format!(
        "  {} without a raw file",
        if summary.unmatched > 0 { unmatched.yellow() } else { unmatched.cyan() }
    ))
    .ok();

    if summary.unresolved > 0 {
        term.write_line(&format!(
            "  {} left unresolved",
            style(summary.unresolved).yellow()
        ))
        .ok();
    }

    if summary.copy_failures > 0 {
        term.write_line(&format!("  {} copies failed", style(summary.copy_failures).red()))
            .ok();
    }
    if summary.collisions > 0 {
        term.write_line(&format!(
            "  {} copies overwrote a raw file with the same name",
            style(summary.collisions).yellow()
        ))
        .ok();
    }
    if summary.skipped > 0 {
        term.write_line(&format!("  {} not copied (dry run)", style(summary.skipped).dim()))
            .ok();
    }
    if summary.cache_hits > 0 {
        term.write_line(&format!("  {} cache hits", style(summary.cache_hits).dim()))
            .ok();
    }
    for error in &result.errors {
        term.write_line(&format!("  {} {}", style("!").yellow(), error)).ok();
    }

    term.write_line("").ok();
    term.write_line(&format!("  Run log:        {}", result.run_log.display())).ok();
    term.write_line(&format!("  Diagnostic log: {}", log_file.display())).ok();
    if let Some(report) = report {
        term.write_line(&format!("  Report:         {}", report.display())).ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("Source files were only read, never moved or deleted.").dim()
    ))
    .ok();
}

fn print_json_results(result: &PipelineResult) {
    let output = serde_json::json!({
        "summary": result.summary,
        "run_log": result.run_log,
        "errors": result.errors,
        "interrupted": result.interrupted.as_ref().map(|e| e.to_string()),
        "previews": result.reports,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize results: {}", e),
    }
}
