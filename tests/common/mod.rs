//! Scripted in-memory download engine shared by the batch and worker tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ytdl_batch::{
    CancellationToken, DownloadContext, DownloadEngine, EngineError, EngineOptions,
    EngineSession, IdentityProvider, MediaInfo, UserAgentPool,
};

/// What the engine does for one URL.
#[derive(Clone)]
pub enum Script {
    /// Resolve `title` and download successfully.
    Succeed(&'static str),
    /// The engine diagnoses the download as failed.
    DownloadError(&'static str),
    /// The engine diagnoses the metadata pass as failed.
    MetadataError(&'static str),
    /// The engine cannot be started.
    SpawnError,
    /// The engine's output cannot be parsed.
    GarbledMetadata,
    /// Something inside the engine panics.
    Panic(&'static str),
    /// Cancel `token` during the transfer, then succeed.
    CancelDuring(CancellationToken),
    /// Cancel `token`, then fail the way an interrupted engine does.
    InterruptedBy(CancellationToken),
}

/// A [`DownloadEngine`] that follows a per-URL script and records every call.
#[derive(Default)]
pub struct ScriptedEngine {
    scripts: HashMap<String, Script>,
    opened: Mutex<Vec<EngineOptions>>,
    downloads: Mutex<Vec<String>>,
    metadata_calls: Mutex<Vec<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behavior for `url`. Unscripted URLs succeed.
    pub fn on(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    pub fn opened(&self) -> Vec<EngineOptions> {
        self.opened.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn metadata_calls(&self) -> Vec<String> {
        self.metadata_calls.lock().unwrap().clone()
    }

    fn script(&self, url: &str) -> Script {
        self.scripts
            .get(url)
            .cloned()
            .unwrap_or(Script::Succeed("Untitled"))
    }
}

impl DownloadEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn open(&self, options: &EngineOptions) -> Result<Box<dyn EngineSession + '_>, EngineError> {
        self.opened.lock().unwrap().push(options.clone());
        Ok(Box::new(ScriptedSession { engine: self }))
    }
}

struct ScriptedSession<'a> {
    engine: &'a ScriptedEngine,
}

impl EngineSession for ScriptedSession<'_> {
    fn extract_info(&mut self, url: &str) -> Result<MediaInfo, EngineError> {
        self.engine
            .metadata_calls
            .lock()
            .unwrap()
            .push(url.to_string());

        match self.engine.script(url) {
            Script::MetadataError(message) => Err(EngineError::Download(message.to_string())),
            Script::SpawnError => Err(EngineError::Spawn {
                program: "yt-dlp".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            }),
            Script::GarbledMetadata => Err(EngineError::Metadata(
                "expected value at line 1 column 1".to_string(),
            )),
            Script::Succeed(title) => Ok(MediaInfo {
                title: Some(title.to_string()),
            }),
            _ => Ok(MediaInfo::default()),
        }
    }

    fn download(&mut self, url: &str) -> Result<(), EngineError> {
        self.engine.downloads.lock().unwrap().push(url.to_string());

        match self.engine.script(url) {
            Script::DownloadError(message) => Err(EngineError::Download(message.to_string())),
            Script::SpawnError => Err(EngineError::Spawn {
                program: "yt-dlp".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            }),
            Script::Panic(message) => panic!("{message}"),
            Script::CancelDuring(token) => {
                token.cancel();
                Ok(())
            }
            Script::InterruptedBy(token) => {
                token.cancel();
                Err(EngineError::Download("ERROR: Interrupted by user".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// A context around `engine` that always sends the same user agent.
pub fn context_with(engine: Arc<ScriptedEngine>) -> DownloadContext {
    let pool = UserAgentPool::from_agents(["TestAgent/1.0"]).unwrap();
    DownloadContext::new(engine, IdentityProvider::new(pool))
}

pub fn urls(items: &[&str]) -> Vec<String> {
    items.iter().map(|url| url.to_string()).collect()
}
