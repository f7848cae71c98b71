//! # ytdl-batch
//!
//! Download many media URLs in parallel with
//! [`yt-dlp`](https://github.com/yt-dlp/yt-dlp), each capped at a maximum
//! video height, sent with a randomized browser user agent, and
//! post-processed with embedded metadata and the thumbnail attached as
//! cover art.
//!
//! The crate is orchestration only: resolving pages, negotiating formats,
//! transferring and remuxing is all done by the engine, one child process
//! per item.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ytdl_batch::{BatchOptions, DownloadContext, run_batch};
//!
//! let urls = vec![
//!     "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
//!     "https://vimeo.com/76979871".to_string(),
//! ];
//! let options = BatchOptions::new("1080").with_output_dir("downloads").with_workers(2);
//!
//! let summary = run_batch(&urls, &options, &DownloadContext::default())?;
//! println!("{} of {} downloaded", summary.succeeded, summary.total);
//! # Ok::<(), ytdl_batch::BatchError>(())
//! ```
//!
//! ## Failure handling
//!
//! - A batch fails as a whole ([`BatchError`]) only when there is nothing to
//!   do or the output directory cannot be created.
//! - Each item's failure is contained by its worker and listed in the
//!   [`BatchSummary`]; siblings keep going.
//! - A missing cookie file or an unusable user-agent list only logs a
//!   warning.
//!
//! ## Requirements
//!
//! `yt-dlp` must be installed (on `PATH`, or passed to [`YtDlp::new`]), and
//! `ffmpeg` must be available to it for merging and thumbnail embedding.

pub mod batch;
pub mod configuration;
pub mod context;
pub mod engine;
pub mod engine_options;
pub mod error;
pub mod identity;
pub mod logging;
pub mod progress;
pub mod signal;
pub mod url_list;
pub mod worker;
pub mod ytdlp;

pub use batch::{BatchOutcome, BatchState, BatchSummary, prepare_output_dir, run_batch};
pub use configuration::{
    BatchOptions, DEFAULT_OUTPUT_DIR, DownloadRequest, default_worker_count, resolve_worker_count,
};
pub use context::DownloadContext;
pub use engine::{DownloadEngine, EngineSession, MediaInfo};
pub use engine_options::{EngineOptions, format_selector, output_template};
pub use error::{BatchError, EngineError, IdentityError};
pub use identity::{FALLBACK_USER_AGENT, IdentityProvider, UserAgentPool};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use signal::cancel_on_interrupt;
pub use url_list::{parse_url_list, read_url_file};
pub use worker::{DownloadResult, UNEXPECTED_ERROR_PREFIX, download_item};
pub use ytdlp::YtDlp;
