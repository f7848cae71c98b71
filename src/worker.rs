//! Single-item download worker.
//!
//! [`download_item`] is the failure-containment boundary of a batch: it
//! always returns a [`DownloadResult`], whatever happens inside the engine,
//! including panics. One item failing can never abort its siblings.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::configuration::DownloadRequest;
use crate::context::DownloadContext;
use crate::engine_options::EngineOptions;
use crate::error::EngineError;

/// Prefix of every failure message not diagnosed by the engine itself.
pub const UNEXPECTED_ERROR_PREFIX: &str = "Unexpected error: ";

/// Outcome of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// URL the result belongs to.
    pub url: String,
    /// Whether the item was downloaded.
    pub success: bool,
    /// Why the item failed; `None` on success.
    pub error: Option<String>,
}

impl DownloadResult {
    /// A successful result.
    pub fn succeeded(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: true,
            error: None,
        }
    }

    /// A failed result with its reason.
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Download one item and report how it went.
///
/// Engine-diagnosed failures are reported verbatim. Anything else (the
/// engine could not be started, its output was unreadable, a panic) is
/// reported as `Unexpected error: <message>`.
pub fn download_item(
    request: &DownloadRequest,
    context: &DownloadContext,
    resolve_title: bool,
) -> DownloadResult {
    let url = request.url.as_str();
    let mut title = request.url.clone();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        transfer(request, context, resolve_title, &mut title)
    }));

    match outcome {
        Ok(Ok(())) => DownloadResult::succeeded(url),
        Ok(Err(error)) if error.is_download_error() => {
            log::error!(
                "{} error downloading '{title}' ({url}): {error}",
                context.engine().name()
            );
            DownloadResult::failed(url, error.to_string())
        }
        Ok(Err(error)) => {
            log::error!("Unexpected error downloading '{title}' ({url}): {error}");
            log::debug!("{error:?}");
            DownloadResult::failed(url, format!("{UNEXPECTED_ERROR_PREFIX}{error}"))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("Unexpected error downloading '{title}' ({url}): {message}");
            log::debug!("Worker thread panicked while downloading {url}");
            DownloadResult::failed(url, format!("{UNEXPECTED_ERROR_PREFIX}{message}"))
        }
    }
}

fn transfer(
    request: &DownloadRequest,
    context: &DownloadContext,
    resolve_title: bool,
    title: &mut String,
) -> Result<(), EngineError> {
    let options = EngineOptions::build(request, context.identity());
    let url = request.url.as_str();

    let mut session = context.engine().open(&options)?;
    log::debug!("Starting download: {url} with UA: {}", options.user_agent);

    if resolve_title {
        let info = session.extract_info(url)?;
        if let Some(resolved) = info.title {
            *title = resolved;
        }
    }

    log::info!(
        "Downloading: '{title}' ({url}) to '{}'",
        options.output_dir().display()
    );
    session.download(url)?;
    log::info!("Finished: '{title}' ({url})");
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
