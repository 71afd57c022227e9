//! Progress bars driven by pipeline events.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use raw_matcher::events::{Event, EventReceiver, IndexEvent, MatchEvent, PipelineEvent, PipelinePhase};
use std::thread::{self, JoinHandle};

/// Bars for the two parallel phases
#[derive(Clone)]
pub struct Progress {
    multi: MultiProgress,
    roots: ProgressBar,
    files: ProgressBar,
    previews: ProgressBar,
}

impl Progress {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Bars that never draw (JSON output)
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let bar_style = ProgressStyle::with_template(
            "{spinner:.green} {prefix:>14} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");

        let roots = multi.add(ProgressBar::new(0).with_style(bar_style.clone()));
        roots.set_prefix("Source folders");
        let files = multi.add(ProgressBar::new(0).with_style(bar_style.clone()));
        files.set_prefix("Raw files");
        let previews = multi.add(ProgressBar::new(0).with_style(bar_style));
        previews.set_prefix("Previews");

        Self {
            multi,
            roots,
            files,
            previews,
        }
    }

    /// Remove every bar from the terminal
    pub fn clear(&self) {
        for bar in [&self.roots, &self.files, &self.previews] {
            bar.finish_and_clear();
        }
        self.multi.clear().ok();
    }

    fn handle(&self, event: Event, verbose: bool) {
        match event {
            Event::Index(IndexEvent::Started { roots }) => {
                self.roots.set_length(roots.len() as u64);
            }
            Event::Index(IndexEvent::RootWalked { raw_files, .. }) => {
                self.files.inc_length(raw_files as u64);
            }
            Event::Index(IndexEvent::Progress(p)) => {
                self.files.set_position(p.completed as u64);
                if verbose {
                    self.files.set_message(format!(
                        "{} (cache: {})",
                        p.current_path.file_name().unwrap_or_default().to_string_lossy(),
                        p.cache_hits
                    ));
                }
            }
            Event::Index(IndexEvent::RootCompleted { root, .. }) => {
                self.roots.inc(1);
                if verbose {
                    self.roots.set_message(root.display().to_string());
                }
            }
            Event::Index(IndexEvent::Completed { identity_keys, .. }) => {
                self.files
                    .set_message(format!("{} identity keys", identity_keys));
            }
            Event::Match(MatchEvent::Started { total_previews }) => {
                self.previews.set_length(total_previews as u64);
            }
            Event::Match(MatchEvent::Evaluated { completed, .. }) => {
                self.previews.set_position(completed as u64);
            }
            Event::Match(MatchEvent::Completed { deferred, .. }) => {
                self.previews
                    .set_message(format!("{} need your choice", deferred));
            }
            Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Resolving,
            })
            | Event::Pipeline(PipelineEvent::Completed { .. })
            | Event::Pipeline(PipelineEvent::Error { .. }) => self.clear(),
            _ => {}
        }
    }

    /// Drain `receiver` on a background thread until every sender is dropped
    pub fn spawn(&self, receiver: EventReceiver, verbose: bool) -> JoinHandle<()> {
        let progress = self.clone();
        thread::spawn(move || {
            for event in receiver.iter() {
                progress.handle(event, verbose);
            }
            progress.clear();
        })
    }
}
