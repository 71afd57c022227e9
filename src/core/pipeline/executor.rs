//! Pipeline execution implementation.

use super::MatchConfig;
use crate::core::cache::{CacheBackend, MetadataCache};
use crate::core::identity::IdentityPattern;
use crate::core::index::RawIndexBuilder;
use crate::core::materializer::{ByteCopier, CopyOutcome, FsCopier, Materializer};
use crate::core::matcher::{load_previews, MatchOutcome, Matcher, SelectedPreview};
use crate::core::metadata::{ExifReader, MetadataReader};
use crate::core::reporter::{PreviewReport, PreviewStatus, RunLog};
use crate::core::resolver::{DisambiguationCase, Prompt, Resolver};
use crate::core::scanner::{ExtensionFilter, FileWalker, ScanConfig, WalkDirScanner};
use crate::error::{PromptError, RawMatchError, SetupError};
use crate::events::{
    null_sender, Event, EventSender, MatchEvent, PipelineEvent, PipelinePhase, PipelineSummary,
    ResolveEvent,
};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Result of pipeline execution
#[derive(Debug)]
pub struct PipelineResult {
    pub summary: PipelineSummary,
    /// One row per preview, in preview file-name order
    pub reports: Vec<PreviewReport>,
    /// Non-fatal walk problems
    pub errors: Vec<String>,
    pub run_log: PathBuf,
    /// Why disambiguation stopped early; the open cases are `Unresolved`
    pub interrupted: Option<PromptError>,
}

/// Builder for the matching pipeline
pub struct PipelineBuilder {
    config: MatchConfig,
    reader: Option<Arc<dyn MetadataReader>>,
    raw_walker: Option<Arc<dyn FileWalker>>,
    preview_walker: Option<Arc<dyn FileWalker>>,
    copier: Option<Arc<dyn ByteCopier>>,
    cache_backend: Option<Arc<dyn CacheBackend>>,
}

impl PipelineBuilder {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            reader: None,
            raw_walker: None,
            preview_walker: None,
            copier: None,
            cache_backend: None,
        }
    }

    /// Set the capture-time reader (EXIF by default)
    pub fn reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Set the walker used on the source folders (recursive by default)
    pub fn raw_walker(mut self, walker: Arc<dyn FileWalker>) -> Self {
        self.raw_walker = Some(walker);
        self
    }

    /// Set the walker used on the preview folder (flat by default)
    pub fn preview_walker(mut self, walker: Arc<dyn FileWalker>) -> Self {
        self.preview_walker = Some(walker);
        self
    }

    pub fn copier(mut self, copier: Arc<dyn ByteCopier>) -> Self {
        self.copier = Some(copier);
        self
    }

    /// Set a persistent capture-time cache
    pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        let include_hidden = self.config.include_hidden;
        Pipeline {
            reader: self.reader.unwrap_or_else(|| Arc::new(ExifReader::new())),
            raw_walker: self.raw_walker.unwrap_or_else(|| {
                Arc::new(WalkDirScanner::new(ScanConfig {
                    include_hidden,
                    ..Default::default()
                }))
            }),
            preview_walker: self
                .preview_walker
                .unwrap_or_else(|| Arc::new(WalkDirScanner::new(ScanConfig::flat()))),
            copier: self.copier.unwrap_or_else(|| Arc::new(FsCopier)),
            cache_backend: self.cache_backend,
            config: self.config,
        }
    }
}

/// The preview-to-raw matching pipeline
pub struct Pipeline {
    config: MatchConfig,
    reader: Arc<dyn MetadataReader>,
    raw_walker: Arc<dyn FileWalker>,
    preview_walker: Arc<dyn FileWalker>,
    copier: Arc<dyn ByteCopier>,
    cache_backend: Option<Arc<dyn CacheBackend>>,
}

/// A preview after the parallel matching pass
enum Evaluation {
    Done(PreviewReport),
    Deferred(DisambiguationCase),
}

/// Copy tallies shared by the matching workers
#[derive(Default)]
struct Tally {
    matched: AtomicUsize,
    resolved: AtomicUsize,
    unmatched: AtomicUsize,
    unresolved: AtomicUsize,
    copy_failures: AtomicUsize,
    skipped: AtomicUsize,
    collisions: AtomicUsize,
}

impl Pipeline {
    pub fn builder(config: MatchConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    /// Run the pipeline without events
    pub fn run(&self, prompt: &mut dyn Prompt) -> Result<PipelineResult, RawMatchError> {
        self.run_with_events(prompt, &null_sender())
    }

    /// Run the pipeline with event reporting
    ///
    /// Only setup problems end the run with an error. A failing prompt stops
    /// disambiguation and is returned in [`PipelineResult::interrupted`];
    /// every per-file problem is logged, counted and reported.
    pub fn run_with_events(
        &self,
        prompt: &mut dyn Prompt,
        events: &EventSender,
    ) -> Result<PipelineResult, RawMatchError> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        let result = self.execute(prompt, events, start_time);
        if let Err(e) = &result {
            error!(error = %e, "Run aborted");
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: e.to_string(),
            }));
        }
        result
    }

    fn execute(
        &self,
        prompt: &mut dyn Prompt,
        events: &EventSender,
        start_time: Instant,
    ) -> Result<PipelineResult, RawMatchError> {
        // Setup: nothing below this block runs unless it all succeeds
        self.config.validate()?;
        let (preview_folder, output_folder): (&Path, &Path) =
            match (&self.config.preview_folder, &self.config.output_folder) {
                (Some(p), Some(o)) => (p.as_path(), o.as_path()),
                _ => return Err(SetupError::MissingSetting { name: "folder" }.into()),
            };
        fs::create_dir_all(output_folder).map_err(|e| SetupError::OutputDirectory {
            path: output_folder.to_path_buf(),
            source: e,
        })?;
        let run_log = RunLog::create(output_folder)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| SetupError::ThreadPool(e.to_string()))?;

        let mut cache = MetadataCache::new(Arc::clone(&self.reader));
        if let Some(backend) = &self.cache_backend {
            cache = cache.with_backend(Arc::clone(backend));
        }
        let identity = IdentityPattern::new(&self.config.identity_prefixes);

        info!(
            previews = %preview_folder.display(),
            sources = self.config.source_folders.len(),
            output = %output_folder.display(),
            workers = self.config.workers,
            tolerance_secs = self.config.tolerance_secs,
            dry_run = self.config.dry_run,
            "Starting run"
        );

        // Phase 1: Indexing
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Indexing,
        }));

        let builder = RawIndexBuilder::new(
            Arc::clone(&self.raw_walker),
            ExtensionFilter::new(&[self.config.raw_extension.as_str()])
                .with_hidden(self.config.include_hidden),
            identity.clone(),
        )
        .batch(self.config.batch_plan());
        let index_report =
            pool.install(|| builder.build(&self.config.source_folders, &cache, events));
        let index = index_report.index;
        let mut errors = index_report.errors;
        if index.is_empty() {
            warn!("No raw file with an identity key was found in the source folders");
        }

        info!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Indexing phase complete"
        );

        // Phase 2: Matching
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Matching,
        }));

        let preview_filter = ExtensionFilter::new(&self.config.preview_extensions);
        let preview_load = pool.install(|| {
            load_previews(
                self.preview_walker.as_ref(),
                preview_folder,
                &preview_filter,
                &identity,
                &cache,
            )
        })?;
        errors.extend(preview_load.errors);
        let previews = preview_load.previews;
        let total_previews = previews.len();

        events.send(Event::Match(MatchEvent::Started { total_previews }));

        let matcher = Matcher::new(self.config.tolerance_secs);
        let materializer =
            Materializer::new(output_folder, Arc::clone(&self.copier)).dry_run(self.config.dry_run);
        let tally = Tally::default();
        let completed = AtomicUsize::new(0);

        let evaluations: Vec<Evaluation> = pool.install(|| {
            previews
                .par_iter()
                .map(|preview| {
                    let outcome = matcher.match_preview(preview, &index);
                    let evaluation = match outcome {
                        MatchOutcome::Matched(raw_path) => {
                            tally.matched.fetch_add(1, Ordering::SeqCst);
                            let copy = materializer.materialize(&raw_path, events);
                            Evaluation::Done(Self::record_copy(
                                preview,
                                PreviewStatus::Matched,
                                copy,
                                &run_log,
                                &tally,
                            ))
                        }
                        MatchOutcome::Deferred(candidates) => {
                            info!(
                                preview = %preview.file_name,
                                candidates = candidates.len(),
                                "Deferred for disambiguation"
                            );
                            Evaluation::Deferred(DisambiguationCase {
                                preview: preview.clone(),
                                candidates,
                            })
                        }
                        MatchOutcome::Unmatched(reason) => {
                            warn!(
                                preview = %preview.file_name,
                                captured_at = ?preview.captured_at,
                                reason = %reason,
                                "No raw file for preview"
                            );
                            tally.unmatched.fetch_add(1, Ordering::SeqCst);
                            run_log.unmatched(&preview.file_name, &reason.to_string());
                            Evaluation::Done(Self::report(
                                preview,
                                PreviewStatus::Unmatched,
                                None,
                                reason.to_string(),
                            ))
                        }
                    };

                    events.send(Event::Match(MatchEvent::Evaluated {
                        preview: preview.path.clone(),
                        completed: completed.fetch_add(1, Ordering::SeqCst) + 1,
                        total: total_previews,
                    }));
                    evaluation
                })
                .collect()
        });

        // Deferred cases leave a hole in the report list, filled once resolved
        let mut slots: Vec<Option<PreviewReport>> = Vec::with_capacity(evaluations.len());
        let mut deferred: Vec<(usize, DisambiguationCase)> = Vec::new();
        for evaluation in evaluations {
            match evaluation {
                Evaluation::Done(report) => slots.push(Some(report)),
                Evaluation::Deferred(case) => {
                    deferred.push((slots.len(), case));
                    slots.push(None);
                }
            }
        }

        events.send(Event::Match(MatchEvent::Completed {
            matched: tally.matched.load(Ordering::SeqCst),
            deferred: deferred.len(),
            unmatched: tally.unmatched.load(Ordering::SeqCst),
        }));
        info!(
            matched = tally.matched.load(Ordering::SeqCst),
            deferred = deferred.len(),
            unmatched = tally.unmatched.load(Ordering::SeqCst),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Matching phase complete"
        );

        // Phase 3: Resolving, strictly one case at a time
        let mut interrupted: Option<PromptError> = None;
        if !deferred.is_empty() {
            events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Resolving,
            }));
            events.send(Event::Resolve(ResolveEvent::Started {
                total_cases: deferred.len(),
            }));

            let resolver = Resolver::new();
            for (slot, case) in &deferred {
                if let Some(e) = &interrupted {
                    let reason = e.to_string();
                    slots[*slot] = Some(Self::unresolved(case, &reason, &run_log, &tally));
                    continue;
                }

                match resolver.resolve(case, prompt) {
                    Ok(resolution) => {
                        tally.resolved.fetch_add(1, Ordering::SeqCst);
                        events.send(Event::Resolve(ResolveEvent::Resolved {
                            preview: case.preview.path.clone(),
                            raw: resolution.raw_path.clone(),
                        }));

                        let copy = materializer.materialize(&resolution.raw_path, events);
                        slots[*slot] = Some(Self::record_copy(
                            &case.preview,
                            PreviewStatus::Resolved,
                            copy,
                            &run_log,
                            &tally,
                        ));
                    }
                    Err(e) => {
                        warn!(error = %e, "Disambiguation stopped, leaving open cases unresolved");
                        let reason = e.to_string();
                        slots[*slot] = Some(Self::unresolved(case, &reason, &run_log, &tally));
                        interrupted = Some(e);
                    }
                }
            }

            events.send(Event::Resolve(ResolveEvent::Completed {
                resolved: tally.resolved.load(Ordering::SeqCst),
            }));
        }

        let summary = PipelineSummary {
            total_previews,
            matched: tally.matched.load(Ordering::SeqCst),
            resolved: tally.resolved.load(Ordering::SeqCst),
            unmatched: tally.unmatched.load(Ordering::SeqCst),
            unresolved: tally.unresolved.load(Ordering::SeqCst),
            copy_failures: tally.copy_failures.load(Ordering::SeqCst),
            skipped: tally.skipped.load(Ordering::SeqCst),
            collisions: tally.collisions.load(Ordering::SeqCst),
            cache_hits: cache.stats().memo_hits + cache.stats().persistent_hits,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            total_previews = summary.total_previews,
            matched = summary.matched,
            resolved = summary.resolved,
            unmatched = summary.unmatched,
            unresolved = summary.unresolved,
            copy_failures = summary.copy_failures,
            collisions = summary.collisions,
            cached_paths = cache.len(),
            duration_ms = summary.duration_ms,
            "Run complete"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: summary.clone(),
        }));

        Ok(PipelineResult {
            summary,
            reports: slots.into_iter().flatten().collect(),
            errors,
            run_log: run_log.path().to_path_buf(),
            interrupted,
        })
    }

    /// Report a deferred case the user never settled
    fn unresolved(
        case: &DisambiguationCase,
        reason: &str,
        run_log: &RunLog,
        tally: &Tally,
    ) -> PreviewReport {
        tally.unresolved.fetch_add(1, Ordering::SeqCst);
        run_log.unresolved(&case.preview.file_name, reason);
        Self::report(&case.preview, PreviewStatus::Unresolved, None, reason.to_string())
    }

    /// Turn a copy outcome into the preview's report, logging failures
    fn record_copy(
        preview: &SelectedPreview,
        status: PreviewStatus,
        copy: CopyOutcome,
        run_log: &RunLog,
        tally: &Tally,
    ) -> PreviewReport {
        match copy {
            CopyOutcome::Copied { source, .. } => {
                Self::report(preview, status, Some(source), String::new())
            }
            CopyOutcome::Overwrote {
                source,
                destination,
                previous_source,
                ..
            } => {
                tally.collisions.fetch_add(1, Ordering::SeqCst);
                run_log.collision(&source, &destination, &previous_source);
                let detail = format!("overwrote copy of {}", previous_source.display());
                Self::report(preview, status, Some(source), detail)
            }
            CopyOutcome::AlreadyInPlace { source, .. } => Self::report(
                preview,
                status,
                Some(source),
                "already in the output folder".to_string(),
            ),
            CopyOutcome::Skipped { source, destination } => {
                tally.skipped.fetch_add(1, Ordering::SeqCst);
                let detail = format!("dry run, would copy to {}", destination.display());
                Self::report(preview, PreviewStatus::Skipped, Some(source), detail)
            }
            CopyOutcome::Failed {
                source,
                destination,
                error,
            } => {
                tally.copy_failures.fetch_add(1, Ordering::SeqCst);
                run_log.copy_failed(&source, &destination, &error.to_string());
                Self::report(preview, PreviewStatus::CopyFailed, Some(source), error.to_string())
            }
        }
    }

    fn report(
        preview: &SelectedPreview,
        status: PreviewStatus,
        raw_path: Option<PathBuf>,
        detail: String,
    ) -> PreviewReport {
        PreviewReport {
            preview: preview.file_name.clone(),
            identity_key: preview.identity_key.clone(),
            captured_at: preview.captured_at,
            status,
            raw_path,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::CaptureTime;
    use crate::error::{MetadataError, PromptError};
    use crate::events::EventChannel;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Reader answering by file name
    struct NamedTimes(HashMap<String, CaptureTime>);

    impl MetadataReader for NamedTimes {
        fn capture_time(&self, path: &Path) -> Result<CaptureTime, MetadataError> {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.0
                .get(&name)
                .copied()
                .ok_or(MetadataError::MissingCaptureTime {
                    path: path.to_path_buf(),
                })
        }
    }

    /// Prompt that always gives the same answer
    struct Always {
        answer: &'static str,
        presented: usize,
    }

    impl Always {
        fn new(answer: &'static str) -> Self {
            Self {
                answer,
                presented: 0,
            }
        }
    }

    impl Prompt for Always {
        fn present(&mut self, _case: &DisambiguationCase) -> Result<(), PromptError> {
            self.presented += 1;
            Ok(())
        }
        fn read_choice(&mut self) -> Result<String, PromptError> {
            Ok(self.answer.to_string())
        }
        fn read_manual_path(&mut self) -> Result<String, PromptError> {
            Err(PromptError::InputClosed)
        }
        fn reject(&mut self, _message: &str) -> Result<(), PromptError> {
            Ok(())
        }
    }

    struct Closed;

    impl Prompt for Closed {
        fn present(&mut self, _case: &DisambiguationCase) -> Result<(), PromptError> {
            Ok(())
        }
        fn read_choice(&mut self) -> Result<String, PromptError> {
            Err(PromptError::InputClosed)
        }
        fn read_manual_path(&mut self) -> Result<String, PromptError> {
            Err(PromptError::InputClosed)
        }
        fn reject(&mut self, _message: &str) -> Result<(), PromptError> {
            Ok(())
        }
    }

    fn at(h: u32, m: u32, s: u32) -> CaptureTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    struct Fixture {
        temp_dir: TempDir,
        config: MatchConfig,
        times: HashMap<String, CaptureTime>,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let previews = temp_dir.path().join("previews");
            let card_a = temp_dir.path().join("card_a");
            let card_b = temp_dir.path().join("card_b");
            for dir in [&previews, &card_a, &card_b] {
                fs::create_dir_all(dir).unwrap();
            }
            let config = MatchConfig {
                preview_folder: Some(previews),
                source_folders: vec![card_a, card_b],
                output_folder: Some(temp_dir.path().join("out")),
                raw_extension: "raw".to_string(),
                workers: 2,
                ..Default::default()
            };
            Self {
                temp_dir,
                config,
                times: HashMap::new(),
            }
        }

        fn file(&mut self, dir: &str, name: &str, time: Option<CaptureTime>) -> PathBuf {
            let path = self.temp_dir.path().join(dir).join(name);
            fs::write(&path, format!("{}/{}", dir, name)).unwrap();
            if let Some(time) = time {
                self.times.insert(name.to_string(), time);
            }
            path
        }

        fn pipeline(&self) -> Pipeline {
            Pipeline::builder(self.config.clone())
                .reader(Arc::new(NamedTimes(self.times.clone())))
                .build()
        }

        fn out(&self, name: &str) -> PathBuf {
            self.temp_dir.path().join("out").join(name)
        }
    }

    #[test]
    fn unique_identity_is_copied_without_prompting() {
        let mut fx = Fixture::new();
        fx.file("previews", "IMG_0001.jpg", Some(at(10, 0, 0)));
        let raw = fx.file("card_a", "_DSC0001.RAW", Some(at(10, 0, 0)));
        let mut prompt = Closed;

        let result = fx.pipeline().run(&mut prompt).unwrap();

        assert_eq!(result.summary.matched, 1);
        assert_eq!(result.reports[0].status, PreviewStatus::Matched);
        assert_eq!(fs::read(fx.out("_DSC0001.RAW")).unwrap(), fs::read(&raw).unwrap());
    }

    #[test]
    fn shared_identity_goes_through_the_prompt() {
        let mut fx = Fixture::new();
        fx.file("previews", "IMG_0002.jpg", Some(at(10, 0, 0)));
        fx.file("card_a", "_DSC0002.RAW", Some(at(9, 59, 50)));
        fx.file("card_b", "_DSC0002.RAW", Some(at(10, 0, 30)));
        let mut prompt = Always::new("2");

        let result = fx.pipeline().run(&mut prompt).unwrap();

        assert_eq!(prompt.presented, 1);
        assert_eq!(result.summary.resolved, 1);
        assert_eq!(result.summary.matched, 0);
        assert_eq!(result.reports[0].status, PreviewStatus::Resolved);
        assert_eq!(fs::read(fx.out("_DSC0002.RAW")).unwrap(), b"card_b/_DSC0002.RAW");
    }

    #[test]
    fn unmatched_previews_are_in_the_run_log() {
        let mut fx = Fixture::new();
        fx.file("previews", "IMG_0003.jpg", Some(at(10, 0, 0)));
        fx.file("previews", "holiday.jpg", Some(at(10, 0, 0)));
        fx.file("card_a", "_DSC0003.RAW", None);
        let mut prompt = Closed;

        let result = fx.pipeline().run(&mut prompt).unwrap();

        assert_eq!(result.summary.unmatched, 2);
        let log = fs::read_to_string(&result.run_log).unwrap();
        assert!(log.contains("IMG_0003.jpg: no raw file copied (no raw file with this identity)"));
        assert!(log.contains("holiday.jpg: no raw file copied (identity or timestamp unavailable)"));
    }

    #[test]
    fn closed_prompt_leaves_every_open_case_unresolved() {
        let mut fx = Fixture::new();
        fx.file("previews", "IMG_0004.jpg", Some(at(10, 0, 0)));
        fx.file("previews", "IMG_0007.jpg", Some(at(11, 0, 0)));
        fx.file("previews", "IMG_0008.jpg", Some(at(12, 0, 0)));
        fx.file("card_a", "_DSC0004.RAW", Some(at(10, 0, 0)));
        fx.file("card_b", "_DSC0004.RAW", Some(at(10, 0, 1)));
        fx.file("card_a", "_DSC0007.RAW", Some(at(11, 0, 0)));
        fx.file("card_b", "_DSC0007.RAW", Some(at(11, 0, 2)));
        fx.file("card_a", "_DSC0008.RAW", Some(at(12, 0, 0)));
        let mut prompt = Closed;

        let result = fx.pipeline().run(&mut prompt).unwrap();

        assert!(matches!(result.interrupted, Some(PromptError::InputClosed)));
        assert_eq!(result.summary.matched, 1);
        assert_eq!(result.summary.unresolved, 2);
        let statuses: Vec<_> = result.reports.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                PreviewStatus::Unresolved,
                PreviewStatus::Unresolved,
                PreviewStatus::Matched
            ]
        );
        assert!(result.reports[0].raw_path.is_none());
        assert!(!fx.out("_DSC0004.RAW").exists());

        let log = fs::read_to_string(fx.out("log.txt")).unwrap();
        assert!(log.contains("IMG_0004.jpg: left unresolved"));
        assert!(log.contains("IMG_0007.jpg: left unresolved"));
    }

    #[test]
    fn dry_run_copies_nothing() {
        let mut fx = Fixture::new();
        fx.config.dry_run = true;
        fx.file("previews", "IMG_0005.jpg", Some(at(10, 0, 0)));
        fx.file("card_a", "_DSC0005.RAW", Some(at(10, 0, 0)));
        let mut prompt = Closed;

        let result = fx.pipeline().run(&mut prompt).unwrap();

        assert_eq!(result.summary.skipped, 1);
        assert_eq!(result.reports[0].status, PreviewStatus::Skipped);
        assert!(!fx.out("_DSC0005.RAW").exists());
    }

    #[test]
    fn missing_preview_folder_aborts_before_any_work() {
        let mut fx = Fixture::new();
        fx.config.preview_folder = Some(fx.temp_dir.path().join("nope"));
        let mut prompt = Closed;

        let result = fx.pipeline().run(&mut prompt);

        assert!(matches!(
            result,
            Err(RawMatchError::Setup(SetupError::PreviewFolderNotFound { .. }))
        ));
        assert!(!fx.temp_dir.path().join("out").exists());
    }

    #[test]
    fn phases_are_announced_in_order() {
        let mut fx = Fixture::new();
        fx.file("previews", "IMG_0006.jpg", Some(at(10, 0, 0)));
        fx.file("card_a", "_DSC0006.RAW", Some(at(10, 0, 0)));
        fx.file("card_b", "_DSC0006.RAW", Some(at(10, 0, 5)));
        let (sender, receiver) = EventChannel::new();
        let mut prompt = Always::new("1");

        fx.pipeline().run_with_events(&mut prompt, &sender).unwrap();
        drop(sender);

        let phases: Vec<_> = receiver
            .iter()
            .filter_map(|e| match e {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                PipelinePhase::Indexing,
                PipelinePhase::Matching,
                PipelinePhase::Resolving
            ]
        );
    }
}
