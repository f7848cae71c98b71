//! Download engine abstraction.
//!
//! The worker never talks to `yt-dlp` directly; it opens an
//! [`EngineSession`] through a [`DownloadEngine`] and drives it. Sessions are
//! scoped: whatever a session acquires (child processes, temporary state) is
//! released when it is dropped, on every exit path.
//!
//! [`YtDlp`](crate::YtDlp) is the production engine. Tests substitute their
//! own implementations.

use crate::engine_options::EngineOptions;
use crate::error::EngineError;

/// What a metadata-only pass learns about an item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaInfo {
    /// Human-readable title, when reported.
    pub title: Option<String>,
}

/// A media extraction and download backend.
pub trait DownloadEngine: Send + Sync {
    /// Name of the engine (for logging).
    fn name(&self) -> &str;

    /// Open a session configured with `options`.
    fn open(&self, options: &EngineOptions) -> Result<Box<dyn EngineSession + '_>, EngineError>;
}

/// One configured conversation with the engine, covering a single item.
pub trait EngineSession {
    /// Resolve the item's metadata without downloading anything.
    fn extract_info(&mut self, url: &str) -> Result<MediaInfo, EngineError>;

    /// Download, merge, and post-process the item.
    fn download(&mut self, url: &str) -> Result<(), EngineError>;
}
