//! URL list files.
//!
//! One URL per line. Blank lines and lines whose first non-blank character
//! is `#` are ignored; surrounding whitespace is trimmed.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::BatchError;

/// Extract the URLs from the contents of a URL list.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read a URL list file.
///
/// Fails if the file does not exist, cannot be read, or contains no URLs.
pub fn read_url_file(path: &Path) -> Result<Vec<String>, BatchError> {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let contents = fs::read_to_string(&path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => BatchError::UrlFileNotFound(path.clone()),
        _ => BatchError::UrlFileRead {
            path: path.clone(),
            source,
        },
    })?;

    let urls = parse_url_list(&contents);
    if urls.is_empty() {
        return Err(BatchError::EmptyUrlFile(path));
    }

    log::info!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}
