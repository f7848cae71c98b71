//! Error message tests.
//!
//! These messages end up in logs and in the failure list of the summary, so
//! their wording matters.

use std::io::{Error as IoError, ErrorKind};
use std::path::PathBuf;

use ytdl_batch::{BatchError, EngineError, IdentityError};

#[test]
fn download_error_is_verbatim() {
    let error = EngineError::Download("ERROR: [generic] Unsupported URL: https://a".to_string());
    assert!(error.is_download_error());
    assert_eq!(
        error.to_string(),
        "ERROR: [generic] Unsupported URL: https://a"
    );
}

#[test]
fn other_engine_errors_are_not_download_errors() {
    let spawn = EngineError::Spawn {
        program: "yt-dlp".to_string(),
        source: IoError::new(ErrorKind::NotFound, "No such file or directory"),
    };
    assert!(!spawn.is_download_error());
    assert!(spawn.to_string().starts_with("Failed to start yt-dlp"));

    let exited = EngineError::Exited {
        program: "yt-dlp".to_string(),
        status: "exit status: 2".to_string(),
    };
    assert!(!exited.is_download_error());
    assert_eq!(exited.to_string(), "yt-dlp exited with exit status: 2");

    let io: EngineError = IoError::new(ErrorKind::BrokenPipe, "pipe closed").into();
    assert!(!io.is_download_error());
}

#[test]
fn json_errors_become_metadata_errors() {
    let parse_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: EngineError = parse_error.into();
    assert!(matches!(error, EngineError::Metadata(_)));
    assert!(error.to_string().starts_with("Invalid metadata JSON"));
}

#[test]
fn output_directory_error_names_the_path() {
    let error = BatchError::OutputDirectory {
        path: PathBuf::from("/root/forbidden"),
        source: IoError::new(ErrorKind::PermissionDenied, "Permission denied"),
    };
    let message = error.to_string();
    assert!(message.contains("/root/forbidden"), "{message}");
    assert!(message.contains("Permission denied"), "{message}");
}

#[test]
fn identity_errors() {
    assert_eq!(IdentityError::Empty.to_string(), "User-agent pool is empty");
    let read = IdentityError::Read {
        path: PathBuf::from("agents.txt"),
        source: IoError::new(ErrorKind::NotFound, "missing"),
    };
    assert!(read.to_string().contains("agents.txt"));
}
