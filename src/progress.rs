//! Batch progress reporting and cancellation support.
//!
//! This module provides [`ProgressCallback`] for observing how many items of
//! a batch have finished, [`CancellationToken`] for cooperative interruption,
//! and [`ProgressInfo`] for the snapshot handed to callbacks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ytdl_batch::{BatchOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}/{} done", info.completed, info.total);
//!     }
//! }
//!
//! let options = BatchOptions::new("720").with_progress(Arc::new(PrintProgress));
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

/// A snapshot of batch progress.
///
/// Delivered to [`ProgressCallback::on_progress`] each time an item
/// finishes, successfully or not.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Items finished so far.
    pub completed: u64,
    /// Items dispatched in this batch.
    pub total: u64,
    /// Finished items that succeeded.
    pub succeeded: u64,
    /// Finished items that failed.
    pub failed: u64,
    /// Completion percentage (0.0 – 100.0).
    pub percentage: f32,
    /// Wall-clock time elapsed since dispatch started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on throughput so far.
    pub estimated_remaining: Option<Duration>,
    /// URL of the item that just finished.
    pub last_url: Option<String>,
}

/// Trait for receiving progress updates while a batch runs.
///
/// Callbacks are invoked from the collecting thread only, but must be
/// [`Send`] and [`Sync`] because the options that carry them cross thread
/// boundaries.
///
/// Progress callbacks are **infallible**; they observe but cannot halt the
/// batch. Use [`CancellationToken`] to interrupt.
pub trait ProgressCallback: Send + Sync {
    /// Called once per finished item.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called once after collection stops, whatever the reason.
    fn on_finish(&self) {}
}

/// Discards all progress notifications. Used when no callback is configured.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone this token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread (typically the
/// interrupt watcher) to stop the batch from collecting further results.
///
/// # Example
///
/// ```
/// use ytdl_batch::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    ///
    /// All clones of this token will observe the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks batch timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: u64,
    completed: u64,
    succeeded: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: u64) -> Self {
        Self {
            callback,
            total,
            completed: 0,
            succeeded: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one finished item and fire the callback.
    pub(crate) fn advance(&mut self, url: &str, success: bool) {
        self.completed += 1;
        if success {
            self.succeeded += 1;
        }

        let elapsed = self.start_time.elapsed();
        let percentage = if self.total > 0 {
            (self.completed as f32 / self.total as f32) * 100.0
        } else {
            100.0
        };
        let remaining = self.total.saturating_sub(self.completed);
        let estimated_remaining = (self.completed > 0)
            .then(|| (elapsed / self.completed as u32) * remaining as u32);

        let info = ProgressInfo {
            completed: self.completed,
            total: self.total,
            succeeded: self.succeeded,
            failed: self.completed - self.succeeded,
            percentage,
            elapsed,
            estimated_remaining,
            last_url: Some(url.to_string()),
        };

        self.callback.on_progress(&info);
    }

    pub(crate) fn finish(&self) {
        self.callback.on_finish();
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
