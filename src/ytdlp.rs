//! `yt-dlp` engine.
//!
//! Each call runs the `yt-dlp` executable as a child process, so every item
//! is transferred by its own OS process. The engine's stderr is read line by
//! line: lines go to the debug log, and the last `ERROR:` line becomes the
//! failure message.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};

use crate::engine::{DownloadEngine, EngineSession, MediaInfo};
use crate::engine_options::EngineOptions;
use crate::error::EngineError;

/// Executable name looked up on `PATH`.
pub const YTDLP_PROGRAM: &str = "yt-dlp";

const ERROR_PREFIX: &str = "ERROR:";
const WARNING_PREFIX: &str = "WARNING:";

/// Engine backed by the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    /// Use a specific executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `yt-dlp` on `PATH`.
    ///
    /// When it is not found the bare program name is kept, and every item
    /// will fail with a spawn error naming it.
    pub fn discover() -> Self {
        match which::which(YTDLP_PROGRAM) {
            Ok(path) => {
                log::debug!("Found {} at {}", YTDLP_PROGRAM, path.display());
                Self::new(path)
            }
            Err(error) => {
                log::debug!("{YTDLP_PROGRAM} not found on PATH: {error}");
                Self::new(YTDLP_PROGRAM)
            }
        }
    }

    /// Path of the executable being run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(args).stdin(Stdio::null());
        command
    }

    fn spawn(&self, command: &mut Command) -> Result<ChildGuard, EngineError> {
        command
            .spawn()
            .map(ChildGuard::new)
            .map_err(|source| EngineError::Spawn {
                program: self.program.display().to_string(),
                source,
            })
    }

    fn exit_error(&self, status: ExitStatus, last_error: Option<String>) -> EngineError {
        match last_error {
            Some(message) => EngineError::Download(message),
            None => EngineError::Exited {
                program: self.program.display().to_string(),
                status: status.to_string(),
            },
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::discover()
    }
}

impl DownloadEngine for YtDlp {
    fn name(&self) -> &str {
        YTDLP_PROGRAM
    }

    fn open(&self, options: &EngineOptions) -> Result<Box<dyn EngineSession + '_>, EngineError> {
        Ok(Box::new(YtDlpSession {
            engine: self,
            options: options.clone(),
            active: None,
        }))
    }
}

/// Kills and reaps the child unless it has already been waited on.
struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    fn child_mut(&mut self) -> Option<&mut Child> {
        self.child.as_mut()
    }

    fn wait(&mut self) -> std::io::Result<ExitStatus> {
        match self.child.take() {
            Some(mut child) => child.wait(),
            None => Err(std::io::Error::other("child already reaped")),
        }
    }

    fn wait_with_output(mut self) -> std::io::Result<Output> {
        match self.child.take() {
            Some(child) => child.wait_with_output(),
            None => Err(std::io::Error::other("child already reaped")),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                log::debug!("Killing engine process {}", child.id());
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

/// Session over `yt-dlp`. Owns the child process of the transfer in
/// progress; dropping the session terminates it.
struct YtDlpSession<'a> {
    engine: &'a YtDlp,
    options: EngineOptions,
    active: Option<ChildGuard>,
}

impl EngineSession for YtDlpSession<'_> {
    fn extract_info(&mut self, url: &str) -> Result<MediaInfo, EngineError> {
        let args = self.options.metadata_args(url);
        log::debug!("{} {}", self.engine.program.display(), args.join(" "));

        let mut command = self.engine.command(&args);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        let output = self.engine.spawn(&mut command)?.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_error = stderr
                .lines()
                .rev()
                .find(|line| line.starts_with(ERROR_PREFIX))
                .map(|line| line.trim().to_string());
            return Err(self.engine.exit_error(output.status, last_error));
        }

        parse_media_info(&output.stdout)
    }

    fn download(&mut self, url: &str) -> Result<(), EngineError> {
        let args = self.options.download_args(url);
        log::debug!("{} {}", self.engine.program.display(), args.join(" "));

        let stdout = if self.options.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        };
        let mut command = self.engine.command(&args);
        command.stdout(stdout).stderr(Stdio::piped());

        let guard = self.active.insert(self.engine.spawn(&mut command)?);
        let stderr = guard.child_mut().and_then(|child| child.stderr.take());

        let mut last_error = None;
        if let Some(stderr) = stderr {
            // stderr is not guaranteed to be UTF-8.
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if line.starts_with(ERROR_PREFIX) {
                    last_error = Some(line.to_string());
                } else if line.starts_with(WARNING_PREFIX) {
                    log::warn!("{url}: {line}");
                } else if !line.is_empty() {
                    log::debug!("{url}: {line}");
                }
            }
        }

        let status = guard.wait()?;
        self.active = None;

        if status.success() {
            Ok(())
        } else {
            Err(self.engine.exit_error(status, last_error))
        }
    }
}

/// Read the title out of `--dump-single-json` output.
fn parse_media_info(stdout: &[u8]) -> Result<MediaInfo, EngineError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)?;
    Ok(MediaInfo {
        title: json["title"].as_str().map(str::to_string),
    })
}
