//! BatchOptions and worker-count tests.

use std::path::{Path, PathBuf};

use ytdl_batch::{
    BatchOptions, CancellationToken, DEFAULT_OUTPUT_DIR, default_worker_count,
    resolve_worker_count,
};

// ── BatchOptions builder ───────────────────────────────────────────

#[test]
fn options_defaults() {
    let options = BatchOptions::new("720");
    assert_eq!(options.quality(), "720");
    assert_eq!(options.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
    assert_eq!(options.workers(), default_worker_count());
    assert!(options.resolve_title());

    let debug = format!("{options:?}");
    assert!(debug.contains("BatchOptions"));
    assert!(debug.contains("has_cancellation: false"));
    assert!(debug.contains("quiet: false"));
}

#[test]
fn options_with_workers_clamps_zero() {
    let options = BatchOptions::new("720").with_workers(0);
    assert_eq!(options.workers(), 1);
}

#[test]
fn options_with_cancellation() {
    let options = BatchOptions::new("720").with_cancellation(CancellationToken::new());
    assert!(format!("{options:?}").contains("has_cancellation: true"));
}

#[test]
fn request_carries_batch_settings() {
    let options = BatchOptions::new("1080")
        .with_cookie_file(Some(PathBuf::from("/tmp/cookies.txt")))
        .with_quiet(true)
        .with_identity_override(Some("Custom/1.0".to_string()));

    let request = options.request_for("https://vimeo.com/76979871", Path::new("/srv/videos"));

    assert_eq!(request.url, "https://vimeo.com/76979871");
    assert_eq!(request.quality, "1080");
    assert_eq!(request.output_dir, PathBuf::from("/srv/videos"));
    assert_eq!(request.cookie_file, Some(PathBuf::from("/tmp/cookies.txt")));
    assert!(request.quiet);
    assert_eq!(request.identity_override.as_deref(), Some("Custom/1.0"));
}

// ── Worker count ───────────────────────────────────────────────────

#[test]
fn default_worker_count_is_positive() {
    assert!(default_worker_count() >= 1);
}

#[test]
fn positive_worker_count_is_kept() {
    assert_eq!(resolve_worker_count(3), 3);
    assert_eq!(resolve_worker_count(1), 1);
}

#[test]
fn non_positive_worker_count_falls_back_to_default() {
    assert_eq!(resolve_worker_count(0), default_worker_count());
    assert_eq!(resolve_worker_count(-3), default_worker_count());
}
