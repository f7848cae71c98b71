//! Batch configuration.
//!
//! [`BatchOptions`] is a builder that threads the batch-wide settings
//! (quality, output directory, worker count, cookie file, quiet flag),
//! progress callbacks, and the cancellation token through
//! [`run_batch`](crate::run_batch) without polluting its signature.
//! [`DownloadRequest`] is the per-URL record built from those options at
//! dispatch time.
//!
//! # Example
//!
//! ```no_run
//! use ytdl_batch::{BatchOptions, CancellationToken};
//!
//! let token = CancellationToken::new();
//! let options = BatchOptions::new("1080")
//!     .with_output_dir("downloads")
//!     .with_workers(4)
//!     .with_cookie_file(Some("cookies.txt".into()))
//!     .with_cancellation(token.clone());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// One unit of work: a single URL plus the settings it is downloaded with.
///
/// Built by the orchestrator, moved into exactly one worker, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Media page URL handed to the engine.
    pub url: String,
    /// Maximum video height, e.g. `"720"`.
    pub quality: String,
    /// Directory the media file is written to.
    pub output_dir: PathBuf,
    /// Fixed user agent; `None` draws one from the identity pool.
    pub identity_override: Option<String>,
    /// Netscape cookie file passed through to the engine.
    pub cookie_file: Option<PathBuf>,
    /// Suppress the engine's own console output.
    pub quiet: bool,
}

/// Number of workers used when none (or a non-positive count) is given.
///
/// Equals the available hardware parallelism, never less than one.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Turn a user-supplied worker count into a usable one.
///
/// Non-positive values are replaced by [`default_worker_count`] and a
/// warning is logged.
pub fn resolve_worker_count(requested: i64) -> usize {
    if requested <= 0 {
        let fallback = default_worker_count();
        log::warn!("Invalid process count ({requested}). Using default: {fallback}");
        return fallback;
    }
    usize::try_from(requested).unwrap_or_else(|_| default_worker_count())
}

/// Settings shared by every item of a batch.
///
/// All fields except the quality have defaults: the current directory,
/// one worker per CPU, no cookie file, engine output visible, titles
/// resolved before downloading, no progress callback, no cancellation.
#[derive(Clone)]
pub struct BatchOptions {
    pub(crate) quality: String,
    pub(crate) output_dir: PathBuf,
    pub(crate) workers: usize,
    pub(crate) cookie_file: Option<PathBuf>,
    pub(crate) quiet: bool,
    pub(crate) identity_override: Option<String>,
    pub(crate) resolve_title: bool,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for BatchOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BatchOptions")
            .field("quality", &self.quality)
            .field("output_dir", &self.output_dir)
            .field("workers", &self.workers)
            .field("cookie_file", &self.cookie_file)
            .field("quiet", &self.quiet)
            .field("identity_override", &self.identity_override)
            .field("resolve_title", &self.resolve_title)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl BatchOptions {
    /// Create options for the given maximum video height.
    pub fn new(quality: impl Into<String>) -> Self {
        Self {
            quality: quality.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: default_worker_count(),
            cookie_file: None,
            quiet: false,
            identity_override: None,
            resolve_title: true,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }

    /// Set the directory downloads are written to.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the number of parallel workers. Clamped to a minimum of 1.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Pass a cookie file to the engine.
    #[must_use]
    pub fn with_cookie_file(mut self, path: Option<PathBuf>) -> Self {
        self.cookie_file = path;
        self
    }

    /// Suppress the engine's own console output.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Use a fixed user agent for every request instead of rotating.
    #[must_use]
    pub fn with_identity_override(mut self, user_agent: Option<String>) -> Self {
        self.identity_override = user_agent;
        self
    }

    /// Control whether each item's title is resolved before the transfer.
    /// Defaults to `true`.
    #[must_use]
    pub fn with_resolve_title(mut self, resolve: bool) -> Self {
        self.resolve_title = resolve;
        self
    }

    /// Attach a progress callback, fired once per finished item.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// Once cancelled, the batch stops collecting results and goes straight
    /// to the summary.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Maximum video height.
    pub fn quality(&self) -> &str {
        &self.quality
    }

    /// Output directory as given (not yet resolved).
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Effective worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether titles are resolved before downloading.
    pub fn resolve_title(&self) -> bool {
        self.resolve_title
    }

    /// Build the request for one URL.
    ///
    /// `output_dir` is the already-resolved absolute directory.
    pub fn request_for(&self, url: &str, output_dir: &Path) -> DownloadRequest {
        DownloadRequest {
            url: url.to_string(),
            quality: self.quality.clone(),
            output_dir: output_dir.to_path_buf(),
            identity_override: self.identity_override.clone(),
            cookie_file: self.cookie_file.clone(),
            quiet: self.quiet,
        }
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
