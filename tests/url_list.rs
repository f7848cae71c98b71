//! URL list parsing tests.

use ytdl_batch::{BatchError, parse_url_list, read_url_file};

#[test]
fn parse_skips_comments_and_blank_lines() {
    let contents = "\
# my playlist
https://www.youtube.com/watch?v=dQw4w9WgXcQ

   https://vimeo.com/76979871   
    # indented comment
";
    assert_eq!(
        parse_url_list(contents),
        vec![
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            "https://vimeo.com/76979871".to_string(),
        ]
    );
}

#[test]
fn parse_keeps_order_and_duplicates() {
    let urls = parse_url_list("https://b\nhttps://a\r\nhttps://b\n");
    assert_eq!(urls, vec!["https://b", "https://a", "https://b"]);
}

#[test]
fn read_file_with_urls() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("urls.txt");
    std::fs::write(&path, "https://a\n# comment\n\nhttps://b\n").expect("Failed to write list");

    let urls = read_url_file(&path).expect("Failed to read list");
    assert_eq!(urls, vec!["https://a", "https://b"]);
}

#[test]
fn read_file_with_only_comments() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("urls.txt");
    std::fs::write(&path, "# nothing here\n\n   \n").expect("Failed to write list");

    let error = read_url_file(&path).unwrap_err();
    assert!(matches!(error, BatchError::EmptyUrlFile(_)), "{error:?}");
    assert!(error.to_string().starts_with("No valid URLs found in file"));
}

#[test]
fn read_missing_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temporary_directory.path().join("missing.txt");

    let error = read_url_file(&path).unwrap_err();
    match &error {
        BatchError::UrlFileNotFound(reported) => assert_eq!(reported, &path),
        other => panic!("Expected UrlFileNotFound, got: {other:?}"),
    }
    assert!(error.to_string().contains("URL file not found"));
}

#[test]
fn read_directory_instead_of_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");

    let error = read_url_file(temporary_directory.path()).unwrap_err();
    assert!(matches!(error, BatchError::UrlFileRead { .. }), "{error:?}");
}
