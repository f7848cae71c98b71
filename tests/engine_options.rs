//! Engine option building and `yt-dlp` argument rendering tests.

use std::path::{Path, PathBuf};

use ytdl_batch::{
    BatchOptions, EngineOptions, IdentityProvider, UserAgentPool, format_selector,
    output_template,
};

fn identity() -> IdentityProvider {
    IdentityProvider::new(UserAgentPool::from_agents(["Pool/1.0"]).unwrap())
}

fn position(args: &[String], flag: &str) -> usize {
    args.iter()
        .position(|arg| arg == flag)
        .unwrap_or_else(|| panic!("{flag} missing from {args:?}"))
}

// ── Format and template ────────────────────────────────────────────

#[test]
fn format_selector_caps_every_alternative() {
    assert_eq!(
        format_selector("720"),
        "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/\
         bestvideo[height<=720]+bestaudio/best[height<=720]"
    );
}

#[test]
fn output_template_is_absolute() {
    let template = output_template(Path::new("relative/dir"));
    assert!(template.is_absolute());
    assert!(template.ends_with("relative/dir/%(title)s [%(id)s].%(ext)s"));
}

// ── EngineOptions::build ───────────────────────────────────────────

#[test]
fn build_sets_fixed_post_processing() {
    let request = BatchOptions::new("1080").request_for("https://a", Path::new("/srv"));
    let options = EngineOptions::build(&request, &identity());

    assert_eq!(options.format, format_selector("1080"));
    assert_eq!(options.merge_output_format, "mp4");
    assert!(
        !options
            .download_args("https://a")
            .contains(&"--no-check-certificates".to_string())
    );
    assert!(options.embed_metadata);
    assert!(options.write_thumbnail);
    assert_eq!(options.user_agent, "Pool/1.0");
    assert_eq!(options.output_dir(), Path::new("/srv"));
    assert_eq!(
        options.postprocessor_args,
        vec![(
            "Metadata".to_string(),
            [
                "-map",
                "0",
                "-map",
                "1",
                "-c",
                "copy",
                "-disposition:v:1",
                "attached_pic"
            ]
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
        )]
    );
}

#[test]
fn override_beats_pool() {
    let request = BatchOptions::new("720")
        .with_identity_override(Some("Override/9".to_string()))
        .request_for("https://a", Path::new("/srv"));
    let options = EngineOptions::build(&request, &identity());
    assert_eq!(options.user_agent, "Override/9");
}

#[test]
fn existing_cookie_file_is_passed_through() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let cookies = temporary_directory.path().join("cookies.txt");
    std::fs::write(&cookies, "# Netscape HTTP Cookie File\n").expect("Failed to write cookies");

    let request = BatchOptions::new("720")
        .with_cookie_file(Some(cookies.clone()))
        .request_for("https://a", temporary_directory.path());
    let options = EngineOptions::build(&request, &identity());

    assert_eq!(options.cookie_file, Some(cookies.clone()));
    let args = options.download_args("https://a");
    let index = position(&args, "--cookies");
    assert_eq!(args[index + 1], cookies.display().to_string());
}

#[test]
fn missing_cookie_file_is_dropped() {
    let request = BatchOptions::new("720")
        .with_cookie_file(Some(PathBuf::from("/definitely/not/here/cookies.txt")))
        .request_for("https://a", Path::new("/srv"));
    let options = EngineOptions::build(&request, &identity());

    assert!(options.cookie_file.is_none());
    assert!(!options.download_args("https://a").contains(&"--cookies".to_string()));
}

// ── Argument rendering ─────────────────────────────────────────────

#[test]
fn download_args_render_every_setting() {
    let request = BatchOptions::new("480").request_for("https://a", Path::new("/srv"));
    let options = EngineOptions::build(&request, &identity());
    let args = options.download_args("https://a");

    assert_eq!(args[position(&args, "-f") + 1], format_selector("480"));
    assert_eq!(args[position(&args, "--merge-output-format") + 1], "mp4");
    assert_eq!(args[position(&args, "--user-agent") + 1], "Pool/1.0");
    assert_eq!(
        args[position(&args, "-o") + 1],
        "/srv/%(title)s [%(id)s].%(ext)s"
    );
    assert_eq!(
        args[position(&args, "--postprocessor-args") + 1],
        "Metadata:-map 0 -map 1 -c copy -disposition:v:1 attached_pic"
    );
    assert!(args.contains(&"--embed-metadata".to_string()));
    assert!(args.contains(&"--write-thumbnail".to_string()));
    assert!(!args.contains(&"--quiet".to_string()));
    assert!(!args.contains(&"--no-check-certificates".to_string()));

    // The URL always comes last, after the end-of-options marker.
    assert_eq!(&args[args.len() - 2..], ["--", "https://a"]);
}

#[test]
fn quiet_suppresses_engine_output() {
    let request = BatchOptions::new("720")
        .with_quiet(true)
        .request_for("https://a", Path::new("/srv"));
    let args = EngineOptions::build(&request, &identity()).download_args("https://a");

    assert!(args.contains(&"--quiet".to_string()));
    assert!(args.contains(&"--no-progress".to_string()));
}

#[test]
fn metadata_args_skip_the_download() {
    let request = BatchOptions::new("720").request_for("https://a", Path::new("/srv"));
    let args = EngineOptions::build(&request, &identity()).metadata_args("-starts-with-dash");

    assert_eq!(args[0], "--dump-single-json");
    assert!(args.contains(&"--skip-download".to_string()));
    assert_eq!(args[position(&args, "--user-agent") + 1], "Pool/1.0");
    assert!(!args.contains(&"--embed-metadata".to_string()));
    assert_eq!(&args[args.len() - 2..], ["--", "-starts-with-dash"]);
}
