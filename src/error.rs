//! Error types for the `ytdl-batch` crate.
//!
//! Failures fall into three categories and each has its own type:
//!
//! - [`BatchError`] aborts the whole run before any work is dispatched.
//! - [`EngineError`] is contained per item by the worker and ends up as a
//!   failed [`DownloadResult`](crate::DownloadResult).
//! - [`IdentityError`] is advisory; callers log it and fall back to a
//!   constant user agent.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// Fatal, batch-level failures. Nothing is downloaded when one of these is
/// returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BatchError {
    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirectory {
        /// Absolute path that was being created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: IoError,
    },

    /// The URL list file does not exist.
    #[error("URL file not found: {0}")]
    UrlFileNotFound(PathBuf),

    /// The URL list file exists but could not be read.
    #[error("Error reading URL file '{path}': {source}")]
    UrlFileRead {
        /// Path of the URL list file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: IoError,
    },

    /// The URL list file contains only comments and blank lines.
    #[error("No valid URLs found in file: {0}")]
    EmptyUrlFile(PathBuf),

    /// No URLs were supplied at all.
    #[error("No URLs to download")]
    NoUrls,
}

/// Per-item failures raised while driving the download engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The engine itself reported a failure (unsupported URL, unavailable
    /// video, network error, and so on).
    #[error("{0}")]
    Download(String),

    /// The engine executable could not be started.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying I/O failure.
        #[source]
        source: IoError,
    },

    /// The engine exited unsuccessfully without printing a diagnostic.
    #[error("{program} exited with {status}")]
    Exited {
        /// Program that exited.
        program: String,
        /// Human-readable exit status.
        status: String,
    },

    /// The metadata printed by the engine could not be parsed.
    #[error("Invalid metadata JSON: {0}")]
    Metadata(String),

    /// An I/O error occurred while talking to the engine.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl EngineError {
    /// Returns `true` for failures the engine itself diagnosed.
    ///
    /// These are reported verbatim; everything else is reported as an
    /// unexpected error.
    pub fn is_download_error(&self) -> bool {
        matches!(self, EngineError::Download(_))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::Metadata(error.to_string())
    }
}

/// The user-agent pool could not be constructed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    /// The user-agent list file could not be read.
    #[error("Failed to read user-agent file '{path}': {source}")]
    Read {
        /// Path of the user-agent list.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: IoError,
    },

    /// The pool ended up with no entries.
    #[error("User-agent pool is empty")]
    Empty,
}
