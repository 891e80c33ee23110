//! Writing the fetched bid to the local output file.
use log::info;
use rate_common::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Overwrite `path` with a single `"<label>: <bid>"` line.
pub fn save_bid(path: &Path, label: &str, bid: &str) -> Result<()> {
    fs::write(path, format!("{}: {}\n", label, bid))?;
    info!("Bid saved in {}", path.display());
    Ok(())
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
pub fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}
