//! Batch orchestration.
//!
//! [`run_batch`] creates the output directory, fans one
//! [`DownloadRequest`] per URL out over a fixed-size pool of worker threads
//! (each of which drives its own engine process), collects the
//! [`DownloadResult`]s in completion order, and always finishes with a
//! [`BatchSummary`].
//!
//! A batch moves through these states:
//!
//! ```text
//! Initializing -> DirectoryReady -> Dispatching -> Collecting
//!     -> Completed | Interrupted | CriticalError -> Summarized
//! ```
//!
//! Only a failure to create the output directory skips the summary; it is
//! returned as [`BatchError::OutputDirectory`] before any work starts.
//!
//! # Example
//!
//! ```no_run
//! use ytdl_batch::{BatchOptions, DownloadContext, run_batch};
//!
//! let urls = vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()];
//! let options = BatchOptions::new("720").with_output_dir("out");
//! let summary = run_batch(&urls, &options, &DownloadContext::default())?;
//! assert_eq!(summary.succeeded + summary.failed, summary.total);
//! # Ok::<(), ytdl_batch::BatchError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use log::Level;
use rayon::ThreadPoolBuilder;
use serde_json::json;

use crate::configuration::{BatchOptions, DownloadRequest};
use crate::context::DownloadContext;
use crate::error::BatchError;
use crate::progress::ProgressTracker;
use crate::worker::{DownloadResult, download_item};

/// How often the collector wakes up to check for cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lifecycle of a batch, logged at debug level as it advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Options received, nothing touched yet.
    Initializing,
    /// The output directory exists.
    DirectoryReady,
    /// Requests are being handed to the pool.
    Dispatching,
    /// Waiting for results.
    Collecting,
    /// Every dispatched item reported back.
    Completed,
    /// The user interrupted collection.
    Interrupted,
    /// The orchestration itself failed.
    CriticalError,
    /// The summary has been produced.
    Summarized,
}

impl Display for BatchState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            BatchState::Initializing => "initializing",
            BatchState::DirectoryReady => "directory ready",
            BatchState::Dispatching => "dispatching",
            BatchState::Collecting => "collecting",
            BatchState::Completed => "completed",
            BatchState::Interrupted => "interrupted",
            BatchState::CriticalError => "critical error",
            BatchState::Summarized => "summarized",
        };
        f.write_str(name)
    }
}

/// How collection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every dispatched item reported back.
    Completed,
    /// The batch was interrupted; only results collected so far are included.
    Interrupted,
    /// The orchestration failed; the reason is attached.
    CriticalError(String),
}

impl BatchOutcome {
    fn state(&self) -> BatchState {
        match self {
            BatchOutcome::Completed => BatchState::Completed,
            BatchOutcome::Interrupted => BatchState::Interrupted,
            BatchOutcome::CriticalError(_) => BatchState::CriticalError,
        }
    }
}

/// Aggregated outcome of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    /// Absolute output directory.
    pub output_dir: PathBuf,
    /// Items handed to the pool.
    pub dispatched: usize,
    /// Items that reported back (`succeeded + failed`).
    pub total: usize,
    /// Items downloaded successfully.
    pub succeeded: usize,
    /// Items that failed.
    pub failed: usize,
    /// `(url, reason)` per failed item, in completion order.
    pub failures: Vec<(String, String)>,
    /// Every collected result, in completion order.
    pub results: Vec<DownloadResult>,
    /// How collection ended.
    pub outcome: BatchOutcome,
    /// Wall-clock duration of the batch.
    pub elapsed: Duration,
}

impl BatchSummary {
    fn from_results(
        output_dir: PathBuf,
        dispatched: usize,
        results: Vec<DownloadResult>,
        outcome: BatchOutcome,
        elapsed: Duration,
    ) -> Self {
        let failures: Vec<(String, String)> = results
            .iter()
            .filter(|result| !result.success)
            .map(|result| {
                (
                    result.url.clone(),
                    result.error.clone().unwrap_or_default(),
                )
            })
            .collect();
        let failed = failures.len();

        Self {
            output_dir,
            dispatched,
            total: results.len(),
            succeeded: results.len() - failed,
            failed,
            failures,
            results,
            outcome,
            elapsed,
        }
    }

    /// Returns `true` when every dispatched item succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome == BatchOutcome::Completed && self.failed == 0
    }

    /// The human-readable report, one `(level, line)` per log line.
    pub fn report(&self) -> Vec<(Level, String)> {
        let mut lines = vec![
            (Level::Info, "--- Download Summary ---".to_string()),
            (
                Level::Info,
                format!("Output directory: {}", self.output_dir.display()),
            ),
            (
                Level::Info,
                format!("Total attempted: {} video(s)", self.dispatched),
            ),
            (
                Level::Info,
                format!("Successfully downloaded: {} video(s)", self.succeeded),
            ),
            (
                Level::Info,
                format!("Failed to download: {} video(s)", self.failed),
            ),
        ];
        match &self.outcome {
            BatchOutcome::Completed => {}
            BatchOutcome::Interrupted => lines.push((
                Level::Warn,
                format!(
                    "Interrupted: {} of {} video(s) not reported",
                    self.dispatched - self.total,
                    self.dispatched
                ),
            )),
            BatchOutcome::CriticalError(reason) => {
                lines.push((Level::Error, format!("Batch aborted: {reason}")));
            }
        }
        if !self.failures.is_empty() {
            lines.push((Level::Warn, "Failed URLs:".to_string()));
            for (url, reason) in &self.failures {
                lines.push((Level::Warn, format!("  - {url} (Reason: {reason})")));
            }
        }
        lines.push((Level::Info, "------------------------".to_string()));
        lines
    }

    /// Write the human-readable report to the log.
    pub fn log(&self) {
        for (level, line) in self.report() {
            log::log!(level, "{line}");
        }
    }

    /// Machine-readable form of the summary.
    pub fn to_json(&self) -> serde_json::Value {
        let outcome = match &self.outcome {
            BatchOutcome::Completed => json!({ "status": "completed" }),
            BatchOutcome::Interrupted => json!({ "status": "interrupted" }),
            BatchOutcome::CriticalError(reason) => {
                json!({ "status": "critical_error", "reason": reason })
            }
        };
        let failures: Vec<serde_json::Value> = self
            .failures
            .iter()
            .map(|(url, reason)| json!({ "url": url, "reason": reason }))
            .collect();

        json!({
            "output_dir": self.output_dir.display().to_string(),
            "dispatched": self.dispatched,
            "total": self.total,
            "succeeded": self.succeeded,
            "failed": self.failed,
            "failures": failures,
            "outcome": outcome,
            "elapsed_seconds": self.elapsed.as_secs_f64(),
        })
    }
}

/// Collects results and guarantees the summary is logged exactly once, even
/// if collection unwinds.
struct SummaryGuard {
    output_dir: PathBuf,
    dispatched: usize,
    results: Vec<DownloadResult>,
    finished: bool,
}

impl SummaryGuard {
    fn new(output_dir: PathBuf, dispatched: usize) -> Self {
        Self {
            output_dir,
            dispatched,
            results: Vec::with_capacity(dispatched),
            finished: false,
        }
    }

    fn push(&mut self, result: DownloadResult) {
        self.results.push(result);
    }

    fn len(&self) -> usize {
        self.results.len()
    }

    fn finish(mut self, outcome: BatchOutcome, elapsed: Duration) -> BatchSummary {
        self.finished = true;
        let summary = BatchSummary::from_results(
            self.output_dir.clone(),
            self.dispatched,
            std::mem::take(&mut self.results),
            outcome,
            elapsed,
        );
        summary.log();
        transition(BatchState::Summarized);
        summary
    }
}

impl Drop for SummaryGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let summary = BatchSummary::from_results(
            self.output_dir.clone(),
            self.dispatched,
            std::mem::take(&mut self.results),
            BatchOutcome::CriticalError("collection aborted".to_string()),
            Duration::ZERO,
        );
        summary.log();
    }
}

fn transition(state: BatchState) {
    log::debug!("Batch state: {state}");
}

/// Resolve `dir` to an absolute path and create it with its parents.
pub fn prepare_output_dir(dir: &Path) -> Result<PathBuf, BatchError> {
    let absolute = std::path::absolute(dir).map_err(|source| BatchError::OutputDirectory {
        path: dir.to_path_buf(),
        source,
    })?;

    fs::create_dir_all(&absolute).map_err(|source| BatchError::OutputDirectory {
        path: absolute.clone(),
        source,
    })?;

    if dir != Path::new(".") {
        log::info!("Ensured output directory exists: {}", absolute.display());
    }
    Ok(absolute)
}

/// Download every URL and summarize the outcome.
///
/// Returns an error only if there is nothing to do or the output directory
/// cannot be created; in both cases no download is attempted. Every other
/// path, including interruption through the options' cancellation token,
/// ends with a logged [`BatchSummary`].
pub fn run_batch(
    urls: &[String],
    options: &BatchOptions,
    context: &DownloadContext,
) -> Result<BatchSummary, BatchError> {
    transition(BatchState::Initializing);
    if urls.is_empty() {
        return Err(BatchError::NoUrls);
    }

    log::info!("Starting download process for {} videos.", urls.len());
    log::info!("Quality: {}p", options.quality);
    log::info!("Using {} parallel processes.", options.workers);
    if let Some(cookie_file) = &options.cookie_file {
        log::info!("Using cookie file: {}", cookie_file.display());
    }

    let output_dir = prepare_output_dir(&options.output_dir)?;
    log::info!("Output directory: {}", output_dir.display());
    transition(BatchState::DirectoryReady);

    let requests: Vec<DownloadRequest> = urls
        .iter()
        .map(|url| options.request_for(url, &output_dir))
        .collect();

    let mut report = SummaryGuard::new(output_dir, requests.len());
    let mut tracker = ProgressTracker::new(options.progress.clone(), requests.len() as u64);
    let outcome = dispatch(requests, options, context, &mut report, &mut tracker);
    tracker.finish();
    transition(outcome.state());

    Ok(report.finish(outcome, tracker.elapsed()))
}

fn dispatch(
    requests: Vec<DownloadRequest>,
    options: &BatchOptions,
    context: &DownloadContext,
    report: &mut SummaryGuard,
    tracker: &mut ProgressTracker,
) -> BatchOutcome {
    transition(BatchState::Dispatching);
    let total = requests.len();

    let pool = match ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(|index| format!("worker-{}", index + 1))
        .build()
    {
        Ok(pool) => pool,
        Err(error) => {
            log::error!("A critical error occurred while starting workers: {error}");
            return BatchOutcome::CriticalError(error.to_string());
        }
    };

    let (sender, receiver) = mpsc::channel::<DownloadResult>();
    for request in requests {
        let sender = sender.clone();
        let context = context.clone();
        let cancellation = options.cancellation.clone();
        let resolve_title = options.resolve_title;

        pool.spawn(move || {
            if cancellation.is_some_and(|token| token.is_cancelled()) {
                log::debug!("Skipping {}: batch interrupted", request.url);
                return;
            }
            let result = download_item(&request, &context, resolve_title);
            // The collector may already have stopped listening.
            let _ = sender.send(result);
        });
    }
    drop(sender);

    transition(BatchState::Collecting);
    loop {
        if options.is_cancelled() {
            log::warn!("Download interrupted by user.");
            return BatchOutcome::Interrupted;
        }

        match receiver.recv_timeout(POLL_INTERVAL) {
            Ok(result) => {
                // Engine processes receive the same interrupt. Failures that
                // arrive once the token is cancelled are not counted.
                if !result.success && options.is_cancelled() {
                    log::debug!("Discarding failure of {} after interrupt", result.url);
                    log::warn!("Download interrupted by user.");
                    return BatchOutcome::Interrupted;
                }
                tracker.advance(&result.url, result.success);
                report.push(result);
                if report.len() == total {
                    return BatchOutcome::Completed;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if options.is_cancelled() {
                    log::warn!("Download interrupted by user.");
                    return BatchOutcome::Interrupted;
                }
                let missing = total - report.len();
                log::error!("Workers exited without reporting {missing} item(s)");
                return BatchOutcome::CriticalError(format!(
                    "{missing} item(s) never reported a result"
                ));
            }
        }
    }
}
