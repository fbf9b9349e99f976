use crate::client::Compressor;
use crate::constants::{
    BATCH_PREFIX, DEFAULT_BATCH_SIZE, DEFAULT_COOLDOWN_SECS, FAILURE_PREFIX, INFO_PREFIX,
    RETRY_HINT, SKIP_PREFIX, SUCCESS_PREFIX,
};
use crate::error::{Result, TinyError};
use crate::failures::FailureStore;
use crate::outcome::{CompressionOutcome, FileReport, RunSummary};
use crate::resolver::{resolve, ImageFile, ResolverInput};
use crate::utils::{create_progress_spinner, format_file_size};
use futures::future::join_all;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub cooldown: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
        }
    }
}

impl BatchOptions {
    pub fn new(batch_size: Option<usize>, cooldown_secs: Option<u64>) -> Result<Self> {
        let batch_size = batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(TinyError::InvalidBatchSize(batch_size));
        }

        Ok(Self {
            batch_size,
            cooldown: Duration::from_secs(cooldown_secs.unwrap_or(DEFAULT_COOLDOWN_SECS)),
        })
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Resolving,
    Batching,
    UploadingBatch { index: usize, total: usize },
    Cooldown { after: usize },
    Summarizing,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Resolving => write!(f, "resolving"),
            RunPhase::Batching => write!(f, "batching"),
            RunPhase::UploadingBatch { index, total } => {
                write!(f, "uploading batch {}/{}", index, total)
            }
            RunPhase::Cooldown { after } => write!(f, "cooldown after batch {}", after),
            RunPhase::Summarizing => write!(f, "summarizing"),
            RunPhase::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome {
    NothingToRetry,
    Completed(RunSummary),
}

/// Splits `files` into consecutive batches of at most `batch_size`.
pub fn partition(files: &[ImageFile], batch_size: usize) -> Vec<&[ImageFile]> {
    files.chunks(batch_size.max(1)).collect()
}

/// Drives a whole run: batches, cooldowns, summary and failure bookkeeping.
pub struct BatchOrchestrator<C> {
    compressor: C,
    options: BatchOptions,
    store: FailureStore,
}

impl<C: Compressor> BatchOrchestrator<C> {
    pub fn new(compressor: C, options: BatchOptions, store: FailureStore) -> Self {
        Self {
            compressor,
            options,
            store,
        }
    }

    pub fn store(&self) -> &FailureStore {
        &self.store
    }

    fn enter(&self, phase: RunPhase) {
        crate::verbose!("phase: {}", phase);
    }

    /// Resolves `input` and runs the result.
    pub async fn execute(&self, input: &ResolverInput) -> RunSummary {
        self.enter(RunPhase::Idle);
        self.enter(RunPhase::Resolving);
        let resolution = resolve(input);
        self.run(resolution.files).await
    }

    /// Compresses `files` batch by batch.
    ///
    /// Never fails: per-file errors land in the summary and failure-store
    /// problems are downgraded to warnings.
    pub async fn run(&self, files: Vec<ImageFile>) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();

        if files.is_empty() {
            crate::info!("{} No images found.", FAILURE_PREFIX);
            self.summarize(&summary, start_time);
            return summary;
        }

        self.enter(RunPhase::Batching);
        let batches = partition(&files, self.options.batch_size);
        let total = batches.len();
        crate::info!(
            "{} Found {} image{} in {} batch{}",
            INFO_PREFIX,
            files.len(),
            if files.len() == 1 { "" } else { "s" },
            total,
            if total == 1 { "" } else { "es" }
        );

        for (i, batch) in batches.into_iter().enumerate() {
            let index = i + 1;
            self.enter(RunPhase::UploadingBatch { index, total });
            crate::info!(
                "{} Processing batch {}/{} ({} file{})...",
                BATCH_PREFIX,
                index,
                total,
                batch.len(),
                if batch.len() == 1 { "" } else { "s" }
            );

            let reports = self.run_batch(batch).await;
            for report in &reports {
                print_report(report);
            }
            summary.reports.extend(reports);
            summary.batches += 1;

            if index < total {
                self.enter(RunPhase::Cooldown { after: index });
                cooldown(self.options.cooldown).await;
                summary.cooldowns += 1;
            }
        }

        self.summarize(&summary, start_time);
        summary
    }

    /// Runs every file of one batch concurrently and waits for all of them.
    async fn run_batch(&self, batch: &[ImageFile]) -> Vec<FileReport> {
        let outcomes = join_all(batch.iter().map(|file| self.compressor.compress(file))).await;
        batch
            .iter()
            .cloned()
            .zip(outcomes)
            .map(|(file, outcome)| FileReport::new(file, outcome))
            .collect()
    }

    fn summarize(&self, summary: &RunSummary, start_time: Instant) {
        self.enter(RunPhase::Summarizing);

        if summary.total() > 0 {
            crate::info!("\n📊 Compression Summary:");
            crate::info!("  {} Compressed: {}", SUCCESS_PREFIX, summary.succeeded());
            crate::info!("  {} Skipped: {}", SKIP_PREFIX, summary.skipped());
            crate::info!("  {} Failed: {}", FAILURE_PREFIX, summary.failed());
            crate::info!("  💾 Total saved: {}", format_file_size(summary.saved_bytes()));
            crate::info!("  ⏱️  Total time: {:.2?}", start_time.elapsed());
        }

        let failed = summary.failed_records();
        if failed.is_empty() {
            if let Err(e) = self.store.clear() {
                crate::warn!("Could not remove {}: {}", self.store.path().display(), e);
            }
        } else {
            match self.store.save(&failed) {
                Ok(()) => crate::info!("💡 {}", RETRY_HINT),
                Err(e) => crate::warn!(
                    "Could not record failed files in {}: {}",
                    self.store.path().display(),
                    e
                ),
            }
        }

        self.enter(RunPhase::Done);
    }

    /// Re-runs the files recorded by the previous run's failures.
    pub async fn retry_failed(&self) -> RetryOutcome {
        let document = match self.store.load() {
            Some(document) if !document.is_empty() => document,
            _ => return RetryOutcome::NothingToRetry,
        };

        crate::info!(
            "🔄 Retrying {} file{} that failed at {}",
            document.files.len(),
            if document.files.len() == 1 { "" } else { "s" },
            document.timestamp.to_rfc3339()
        );

        let input = ResolverInput::from_paths(&document.paths());
        RetryOutcome::Completed(self.execute(&input).await)
    }
}

fn print_report(report: &FileReport) {
    let path = report.file.path.display();
    match &report.outcome {
        CompressionOutcome::Compressed {
            saved_bytes,
            percent,
        } => crate::info!(
            "{} Saved {} ({:.2}%) for `{}`",
            SUCCESS_PREFIX,
            format_file_size(*saved_bytes),
            percent,
            path
        ),
        CompressionOutcome::Skipped(reason) => crate::info!(
            "{} Couldn't compress `{}` any further ({})",
            SKIP_PREFIX,
            path,
            reason
        ),
        CompressionOutcome::Failed(message) => {
            crate::error!("Failed to compress `{}`: {}", path, message);
        }
    }
}

/// Waits out the inter-batch delay, counting down once per second.
async fn cooldown(duration: Duration) {
    if duration.is_zero() {
        return;
    }

    let spinner = create_progress_spinner("");
    let deadline = tokio::time::Instant::now() + duration;
    loop {
        let now = tokio::time::Instant::now();
        if now >= deadline {
            break;
        }
        let remaining = deadline - now;
        spinner.set_message(format!(
            "Cooling down, next batch in {}s...",
            remaining.as_secs_f64().ceil() as u64
        ));
        spinner.tick();
        tokio::time::sleep(remaining.min(Duration::from_secs(1))).await;
    }
    spinner.finish_and_clear();
}
