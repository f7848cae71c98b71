//! Per-item engine options.
//!
//! [`EngineOptions::build`] turns one [`DownloadRequest`] into everything the
//! download engine needs to know: where to write, which formats to pick, how
//! to post-process, and which identity and cookies to present. Building is
//! pure apart from checking whether the cookie file exists.
//!
//! The bundle renders itself as `yt-dlp` command-line arguments through
//! [`EngineOptions::download_args`] and [`EngineOptions::metadata_args`].

use std::path::{Path, PathBuf};

use crate::configuration::DownloadRequest;
use crate::identity::IdentityProvider;

/// Container the merged output is written in.
pub const MERGE_OUTPUT_FORMAT: &str = "mp4";

/// File name pattern: title plus video id, so two videos with the same title
/// do not overwrite each other.
pub const OUTPUT_FILENAME_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";

/// Remux arguments that attach the downloaded thumbnail as cover art.
pub const THUMBNAIL_REMUX_ARGS: &[&str] = &[
    "-map",
    "0",
    "-map",
    "1",
    "-c",
    "copy",
    "-disposition:v:1",
    "attached_pic",
];

/// Post-processor the thumbnail remux arguments are attached to.
const METADATA_POSTPROCESSOR: &str = "Metadata";

/// Format selector for a maximum height.
///
/// Prefers an mp4 video with m4a audio, then any video with any audio, then
/// the best single file, always capped at `quality` pixels high.
pub fn format_selector(quality: &str) -> String {
    format!(
        "bestvideo[height<={quality}][ext=mp4]+bestaudio[ext=m4a]/\
         bestvideo[height<={quality}]+bestaudio/\
         best[height<={quality}]"
    )
}

/// Absolute output template inside `output_dir`.
pub fn output_template(output_dir: &Path) -> PathBuf {
    let dir = std::path::absolute(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    dir.join(OUTPUT_FILENAME_TEMPLATE)
}

/// Everything the engine needs to download one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Absolute output path template.
    pub output_template: PathBuf,
    /// Format selection expression.
    pub format: String,
    /// Container separate video and audio streams are merged into.
    pub merge_output_format: String,
    /// Suppress the engine's own console output.
    pub quiet: bool,
    /// User agent sent with every request for this item.
    pub user_agent: String,
    /// Cookie file, only set when the file exists.
    pub cookie_file: Option<PathBuf>,
    /// Embed title, uploader, date and similar tags into the file.
    pub embed_metadata: bool,
    /// Download the thumbnail next to the media.
    pub write_thumbnail: bool,
    /// Extra arguments per post-processor, as `(name, args)`.
    pub postprocessor_args: Vec<(String, Vec<String>)>,
}

impl EngineOptions {
    /// Build the options for one request.
    ///
    /// A cookie file that was asked for but does not exist is left out with
    /// a warning; the download still proceeds without it.
    pub fn build(request: &DownloadRequest, identity: &IdentityProvider) -> Self {
        let cookie_file = match &request.cookie_file {
            Some(path) if path.exists() => {
                log::debug!("Using cookie file: {} for {}", path.display(), request.url);
                Some(path.clone())
            }
            Some(path) => {
                log::warn!("Cookie file specified but not found: {}", path.display());
                None
            }
            None => None,
        };

        Self {
            output_template: output_template(&request.output_dir),
            format: format_selector(&request.quality),
            merge_output_format: MERGE_OUTPUT_FORMAT.to_string(),
            quiet: request.quiet,
            user_agent: identity.user_agent(request.identity_override.as_deref()),
            cookie_file,
            embed_metadata: true,
            write_thumbnail: true,
            postprocessor_args: vec![(
                METADATA_POSTPROCESSOR.to_string(),
                THUMBNAIL_REMUX_ARGS.iter().map(|arg| arg.to_string()).collect(),
            )],
        }
    }

    /// Directory the output template points into.
    pub fn output_dir(&self) -> &Path {
        self.output_template.parent().unwrap_or(Path::new("."))
    }

    /// Arguments shared by the metadata pass and the transfer: identity and
    /// cookies. Certificate verification is left at the engine's default (on).
    fn network_args(&self) -> Vec<String> {
        let mut args = vec!["--user-agent".to_string(), self.user_agent.clone()];

        if let Some(path) = &self.cookie_file {
            args.push("--cookies".to_string());
            args.push(path.display().to_string());
        }

        args
    }

    /// Arguments for a metadata-only pass that prints the item as JSON.
    pub fn metadata_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.network_args());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments for the actual transfer.
    pub fn download_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--newline".to_string(),
            "-o".to_string(),
            self.output_template.display().to_string(),
            "-f".to_string(),
            self.format.clone(),
            "--merge-output-format".to_string(),
            self.merge_output_format.clone(),
        ];

        if self.quiet {
            args.push("--quiet".to_string());
            args.push("--no-progress".to_string());
        }

        args.extend(self.network_args());

        if self.embed_metadata {
            args.push("--embed-metadata".to_string());
        }

        if self.write_thumbnail {
            args.push("--write-thumbnail".to_string());
        }

        for (postprocessor, pp_args) in &self.postprocessor_args {
            args.push("--postprocessor-args".to_string());
            args.push(format!("{postprocessor}:{}", pp_args.join(" ")));
        }

        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}
