//! Utility functions for log formatting, response classification, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging response bodies
//! - JSON error detection for handling LLM response truncation
//! - Per-ticker output path construction
//! - File system validation for the output directory

use crate::error::SentimentError;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to the
/// nearest character boundary) with an ellipsis and byte count appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// When an LLM reply is cut off by its token limit the JSON fails to parse
/// with an EOF error, which is reported differently from a malformed reply.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// The CSV path for `symbol` inside `sentiment_dir`.
///
/// The output file is `{sentiment_dir}/{symbol}_sentiment.csv`.
pub fn output_path(sentiment_dir: &Path, symbol: &str) -> PathBuf {
    sentiment_dir.join(format!("{symbol}_sentiment.csv"))
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns [`SentimentError::Io`] if the directory cannot be created or is
/// not writable (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), SentimentError> {
    fs::create_dir_all(path).await?;
    // Sync scratch write; std fs has the simpler error surface here
    let scratch_path = path.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}
