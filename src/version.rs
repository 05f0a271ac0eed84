//! Version token extraction from the build metadata file (stage 1).

use crate::error::ParseError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// First numeric token, with optional dot-separated groups ("42", "1.2.3")
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:\.[0-9]+)*").expect("version regex is valid")
});

/// Extract the version identifier from a metadata file.
///
/// Returns exactly the first numeric substring, independent of surrounding
/// non-numeric text: a file containing `Build 42` yields `42`. The value is
/// only ever used for display, so it stays a string.
pub fn extract_version(metadata_file: &Path) -> std::result::Result<String, ParseError> {
    let content =
        std::fs::read_to_string(metadata_file).map_err(|e| ParseError::MetadataMissing {
            path: metadata_file.to_path_buf(),
            reason: e.to_string(),
        })?;

    match VERSION_RE.find(&content) {
        Some(m) => Ok(m.as_str().to_string()),
        None => Err(ParseError::NoVersionToken {
            path: metadata_file.to_path_buf(),
        }),
    }
}
