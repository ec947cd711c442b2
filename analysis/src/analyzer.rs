//! Directory traversal and batched, parallel document processing.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use schema_survey_core::ROOT_PATH;
use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, FileError, Result};
use crate::tracker::{SchemaTracker, TrackerSnapshot};

/// Cumulative progress passed to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Files finished so far, whether they parsed or not.
    pub processed: usize,
    /// Files discovered for this run.
    pub total: usize,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// Frozen statistics of every successfully parsed document.
    pub snapshot: TrackerSnapshot,
    /// Per-file failures in input order.
    pub errors: Vec<FileError>,
    /// Files matched by the pattern, including failed ones.
    pub files_discovered: usize,
    pub elapsed: Duration,
}

/// Surveys a directory of JSON documents.
///
/// Files are processed in sequential batches of
/// [`batch_size`](AnalyzerConfig::batch_size); inside a batch they fan out
/// to a worker pool of [`parallelism`](AnalyzerConfig::parallelism) threads.
/// Only documents from the current batch are in memory at once.
///
/// # Examples
///
/// ```no_run
/// use schema_survey_analysis::{AnalyzerConfig, DirectoryAnalyzer};
///
/// let analyzer = DirectoryAnalyzer::new(AnalyzerConfig::default());
/// let outcome = analyzer.analyze("data/movements", "*.json").unwrap();
/// println!(
///     "{} documents, {} errors",
///     outcome.snapshot.total_files,
///     outcome.errors.len()
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirectoryAnalyzer {
    config: AnalyzerConfig,
}

impl DirectoryAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Surveys every file under `directory` whose name matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryNotFound`](AnalysisError::DirectoryNotFound) when
    /// `directory` does not exist and
    /// [`InvalidPattern`](AnalysisError::InvalidPattern) for a malformed
    /// glob. Unreadable or malformed documents never fail the run; they are
    /// listed in [`AnalysisOutcome::errors`].
    pub fn analyze(&self, directory: impl AsRef<Path>, pattern: &str) -> Result<AnalysisOutcome> {
        self.analyze_with_progress(directory, pattern, &|_| {})
    }

    /// Like [`analyze`](Self::analyze), calling `on_progress` every
    /// [`progress_interval`](AnalyzerConfig::progress_interval) files.
    pub fn analyze_with_progress(
        &self,
        directory: impl AsRef<Path>,
        pattern: &str,
        on_progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<AnalysisOutcome> {
        let directory = directory.as_ref();
        let files = collect_input_files(directory, pattern)?;
        info!(
            directory = %directory.display(),
            pattern,
            files = files.len(),
            "Discovered input files"
        );
        self.analyze_files(&files, on_progress)
    }

    /// Surveys an explicit list of files in the given order.
    pub fn analyze_files(
        &self,
        files: &[PathBuf],
        on_progress: &(dyn Fn(Progress) + Sync),
    ) -> Result<AnalysisOutcome> {
        let started = Instant::now();
        let batch_size = self.config.batch_size.max(1);
        let interval = self.config.progress_interval.max(1);
        let jobs = self.config.effective_parallelism();
        let total = files.len();
        let batches = total.div_ceil(batch_size);

        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        let tracker = SchemaTracker::new(self.config.indexed_array_limit);
        let processed = AtomicUsize::new(0);
        let mut errors = Vec::new();

        for (index, batch) in files.chunks(batch_size).enumerate() {
            debug!(batch = index + 1, batches, files = batch.len(), jobs, "Processing batch");

            let batch_errors: Vec<FileError> = pool.install(|| {
                batch
                    .par_iter()
                    .filter_map(|path| {
                        let result = self.process_file(&tracker, path);
                        let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                        if done % interval == 0 {
                            info!(processed = done, total, "Survey progress");
                            on_progress(Progress {
                                processed: done,
                                total,
                            });
                        }
                        result.err()
                    })
                    .collect()
            });
            errors.extend(batch_errors);
        }

        let snapshot = tracker.into_snapshot();
        let elapsed = started.elapsed();
        info!(
            documents = snapshot.total_files,
            fields = snapshot.fields.len(),
            errors = errors.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Survey complete"
        );

        Ok(AnalysisOutcome {
            snapshot,
            errors,
            files_discovered: total,
            elapsed,
        })
    }

    fn process_file(&self, tracker: &SchemaTracker, path: &Path) -> std::result::Result<(), FileError> {
        let document = read_document(path).inspect_err(|err| {
            warn!(path = %path.display(), error = %err.message, "Skipping unreadable document");
        })?;

        tracker.add_file();
        tracker.track(ROOT_PATH, &document);
        for headline in &self.config.headline_fields {
            if let Some(value) = document.get(&headline.key).and_then(Value::as_str) {
                tracker.record_headline(&headline.key, value);
            }
        }
        Ok(())
    }
}

fn read_document(path: &Path) -> std::result::Result<Value, FileError> {
    let raw = fs::read(path).map_err(|err| FileError::new(path, err))?;
    serde_json::from_slice(&raw).map_err(|err| FileError::new(path, err))
}

/// Recursively collects files under `directory` whose file name matches
/// the glob `pattern`, sorted by path.
///
/// Symbolic links are followed. Entries that cannot be read are skipped
/// with a warning; only a missing `directory` fails the walk.
pub fn collect_input_files(directory: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Err(AnalysisError::DirectoryNotFound(directory.to_path_buf()));
    }
    let matcher = glob::Pattern::new(pattern)?;

    let paths: BTreeSet<PathBuf> = WalkDir::new(directory)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|err| warn!(error = %err, "Skipping unreadable entry"))
                .ok()
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| matcher.matches(name))
        })
        .map(DirEntry::into_path)
        .collect();

    Ok(paths.into_iter().collect())
}
