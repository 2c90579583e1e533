//! Utility functions for text cleaning, log truncation, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Tag stripping and whitespace cleanup for scraped titles and sources
//! - String truncation for logging response bodies
//! - Output path validation before the first cycle runs

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove every `<...>` tag from a string.
///
/// Search engines wrap the matched query term in `<em>` inside headlines;
/// this drops the markers and keeps the text between them.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_tags("<em>Acme</em> shares rise"), "Acme shares rise");
/// ```
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Clean a headline: strip tags, then trim surrounding whitespace.
pub fn clean_title(s: &str) -> String {
    strip_tags(s).trim().to_string()
}

/// Clean a source/byline: strip tags, then drop all whitespace.
///
/// Bylines on result pages are split across several inline elements
/// (outlet, relative time) separated by layout whitespace.
///
/// # Arguments
///
/// * `s` - Raw byline text, possibly containing markup
///
/// # Returns
///
/// The byline with tags and every whitespace character removed. Applying it
/// twice gives the same result as applying it once.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_source("<span>新浪财经</span>\n <span>3小时前</span>"), "新浪财经3小时前");
/// ```
pub fn clean_source(s: &str) -> String {
    WS_RE.replace_all(&strip_tags(s), "").into_owned()
}

/// Truncate a string for logging purposes.
///
/// # Arguments
///
/// * `s` - The string to potentially truncate
/// * `max` - Maximum number of bytes to keep
///
/// # Returns
///
/// The original string if it fits, otherwise the longest prefix ending on a
/// char boundary within `max` bytes, with `"…(+N bytes)"` appended.
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

/// Ensure the directory holding `file_path` exists and is writable.
///
/// Creates the parent directory if needed, then writes and removes a probe
/// file next to the target.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %file_path.display()))]
pub async fn ensure_writable_parent(file_path: &Path) -> std::io::Result<()> {
    let dir = match file_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
