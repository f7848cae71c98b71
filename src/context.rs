//! Shared, read-only state handed to every worker.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::engine::DownloadEngine;
use crate::identity::IdentityProvider;
use crate::ytdlp::YtDlp;

/// The engine and identity provider a batch runs with.
///
/// Built once by the caller and passed down explicitly; cloning is cheap.
#[derive(Clone)]
pub struct DownloadContext {
    engine: Arc<dyn DownloadEngine>,
    identity: IdentityProvider,
}

impl Debug for DownloadContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DownloadContext")
            .field("engine", &self.engine.name())
            .field("identity_fallback", &self.identity.is_fallback())
            .finish()
    }
}

impl DownloadContext {
    /// Combine an engine with an identity provider.
    pub fn new(engine: Arc<dyn DownloadEngine>, identity: IdentityProvider) -> Self {
        Self { engine, identity }
    }

    /// The download engine.
    pub fn engine(&self) -> &dyn DownloadEngine {
        self.engine.as_ref()
    }

    /// The identity provider.
    pub fn identity(&self) -> &IdentityProvider {
        &self.identity
    }
}

impl Default for DownloadContext {
    /// `yt-dlp` from `PATH` with the built-in user-agent pool.
    fn default() -> Self {
        Self::new(Arc::new(YtDlp::discover()), IdentityProvider::default())
    }
}
