use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    sync::Arc,
};

use clap::{ArgGroup, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use ytdl_batch::{
    BatchOptions, BatchOutcome, CancellationToken, DownloadContext, IdentityProvider,
    ProgressCallback, ProgressInfo, YtDlp, default_worker_count, read_url_file,
    resolve_worker_count, run_batch,
};

const CLI_AFTER_HELP: &str = "Examples:\n  ytdl-batch -q 720 -u https://youtu.be/dQw4w9WgXcQ https://vimeo.com/76979871\n  ytdl-batch -q 1080 -f urls.txt -o downloads -p 4 -c cookies.txt\n  ytdl-batch -q 480 -f urls.txt --quiet-ydl --json > summary.json";

#[derive(Debug, Parser)]
#[command(
    name = "ytdl-batch",
    version,
    about = "Download videos concurrently using yt-dlp. Defaults to saving in the current directory.",
    after_help = CLI_AFTER_HELP
)]
#[command(group(ArgGroup::new("input").required(true).args(["urls", "file"])))]
struct Cli {
    /// List of video URLs.
    #[arg(short = 'u', long, num_args = 1.., value_name = "URL")]
    urls: Vec<String>,

    /// Path to a file containing video URLs (one per line, `#` comments allowed).
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Max video quality/height (e.g. 1080, 720).
    #[arg(short = 'q', long, value_parser = parse_quality)]
    quality: String,

    /// Output directory for downloaded videos.
    #[arg(short = 'o', long, default_value = ytdl_batch::DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Number of parallel downloads (defaults to the number of CPUs).
    #[arg(short = 'p', long, allow_negative_numbers = true)]
    processes: Option<i64>,

    /// Path to a cookies file (optional).
    #[arg(short = 'c', long)]
    cookiefile: Option<PathBuf>,

    /// Suppress yt-dlp's own console output.
    #[arg(long)]
    quiet_ydl: bool,

    /// Enable verbose logging for this program.
    #[arg(long)]
    verbose: bool,

    /// Send this user agent with every request instead of rotating.
    #[arg(long, value_name = "STRING")]
    user_agent: Option<String>,

    /// File with user agents to rotate through (one per line).
    #[arg(long, value_name = "FILE")]
    user_agents: Option<PathBuf>,

    /// yt-dlp executable to run (defaults to the one on PATH).
    #[arg(long, value_name = "PATH")]
    yt_dlp: Option<PathBuf>,

    /// Skip the metadata pass that looks up each video's title first.
    #[arg(long)]
    no_resolve_title: bool,

    /// Print the summary as JSON on stdout when done.
    #[arg(long)]
    json: bool,
}

/// Accepts `720` or `720p`; returns the bare height.
fn parse_quality(value: &str) -> Result<String, String> {
    let height = value.trim().trim_end_matches(['p', 'P']);
    if !height.is_empty() && height.chars().all(|c| c.is_ascii_digit()) {
        Ok(height.to_string())
    } else {
        Err(format!("expected a video height such as 720 or 1080, got '{value}'"))
    }
}

fn resolve_cookie_file(path: Option<PathBuf>) -> Option<PathBuf> {
    let path = path?;
    let path = std::path::absolute(&path).unwrap_or(path);
    if !path.exists() {
        log::warn!("Specified cookie file does not exist: {}", path.display());
    }
    Some(path)
}

/// Hidden until the batch starts, so nothing is drawn while URLs load.
fn overall_progress_bar() -> ProgressBar {
    let bar = ProgressBar::hidden();
    let style = ProgressStyle::with_template(
        "{spinner:.green} Overall Progress {bar:40.cyan/blue} {pos}/{len} video(s) {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("##-"));
    bar
}

/// Log sink that clears the progress bar around every record, so log lines
/// and the bar never share a terminal row.
struct SuspendingWriter<W> {
    bar: ProgressBar,
    inner: W,
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.completed);
        if info.failed > 0 {
            self.bar.set_message(format!("({} failed)", info.failed));
        }
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn run(cli: Cli, bar: ProgressBar) -> Result<(), Box<dyn std::error::Error>> {
    let urls = match &cli.file {
        Some(path) => read_url_file(path)?,
        None => cli.urls,
    };

    let workers = cli
        .processes
        .map(resolve_worker_count)
        .unwrap_or_else(default_worker_count);
    let cookie_file = resolve_cookie_file(cli.cookiefile);

    let identity = IdentityProvider::load(cli.user_agents.as_deref());
    let engine = cli
        .yt_dlp
        .as_deref()
        .map(YtDlp::new)
        .unwrap_or_else(YtDlp::discover);
    log::debug!("Using engine at {}", engine.program().display());
    let context = DownloadContext::new(Arc::new(engine), identity);

    let token = CancellationToken::new();
    if let Err(error) = ytdl_batch::cancel_on_interrupt(token.clone()) {
        log::warn!("Could not install interrupt handler: {error}");
    }

    bar.set_length(urls.len() as u64);
    bar.set_draw_target(ProgressDrawTarget::stderr());
    let progress = TerminalProgress { bar };
    let options = BatchOptions::new(cli.quality)
        .with_output_dir(cli.output)
        .with_workers(workers)
        .with_cookie_file(cookie_file)
        .with_quiet(cli.quiet_ydl)
        .with_identity_override(cli.user_agent)
        .with_resolve_title(!cli.no_resolve_title)
        .with_progress(Arc::new(progress))
        .with_cancellation(token);

    let summary = run_batch(&urls, &options, &context)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
    }

    let line = format!(
        "{} of {} video(s) downloaded to {}",
        summary.succeeded,
        summary.dispatched,
        summary.output_dir.display()
    );
    match summary.outcome {
        BatchOutcome::Completed if summary.failed == 0 => {
            eprintln!("{} {}", "success:".green().bold(), line.green());
        }
        BatchOutcome::Completed => {
            eprintln!("{} {}", "partial:".yellow().bold(), line.yellow());
        }
        BatchOutcome::Interrupted => {
            eprintln!("{} {}", "interrupted:".yellow().bold(), line.yellow());
        }
        BatchOutcome::CriticalError(_) => {
            eprintln!("{} {}", "aborted:".red().bold(), line.red());
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let bar = overall_progress_bar();
    let sink = SuspendingWriter {
        bar: bar.clone(),
        inner: io::stderr(),
    };
    ytdl_batch::logging::init(cli.verbose, Some(Box::new(sink)));

    if let Err(error) = run(cli, bar) {
        log::error!("{error}");
        process::exit(1);
    }
}
