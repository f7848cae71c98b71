//! Log output for the command-line front end.
//!
//! Library code only talks to the [`log`] facade; this installs an
//! `env_logger` backend writing lines like
//!
//! ```text
//! 2024-05-01T12:00:00Z - INFO - [worker-3] Finished: 'Title' (https://...)
//! ```
//!
//! The bracketed name identifies the thread, so lines from different workers
//! can be told apart.

use std::io::Write;
use std::thread;

use env_logger::{Builder, Env, Target};

/// Install the global logger.
///
/// `verbose` lowers this crate's level from `info` to `debug`. `RUST_LOG`
/// takes precedence over both. Lines go to stderr unless `pipe` is given, in
/// which case each formatted record is written to it in one piece. Calling
/// this more than once is harmless.
pub fn init(verbose: bool, pipe: Option<Box<dyn Write + Send + 'static>>) {
    let default_filter = if verbose {
        "info,ytdl_batch=debug"
    } else {
        "info"
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format(|buf, record| {
        let current = thread::current();
        writeln!(
            buf,
            "{} - {} - [{}] {}",
            buf.timestamp_seconds(),
            record.level(),
            current.name().unwrap_or("main"),
            record.args()
        )
    });

    if let Some(pipe) = pipe {
        builder.target(Target::Pipe(pipe));
    }

    if builder.try_init().is_ok() && verbose {
        log::debug!("Verbose logging enabled.");
    }
}
