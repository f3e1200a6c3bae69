use chrono::{DateTime, Local};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Rate line written by the replication job into its run log.
const RATE_PATTERN: &str = r"Setting upload rate to (\d+)Kbps\s+\((\d+)% of measured";

fn rate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RATE_PATTERN).expect("rate pattern compiles"))
}

/// Last-modified time of a marker file, or `None` when it is missing.
/// Absence is the expected "never synced" case, never an error.
pub fn last_modified(dir: &Path, name: &str) -> Option<DateTime<Local>> {
    let meta = std::fs::metadata(dir.join(name)).ok()?;
    if !meta.is_file() {
        return None;
    }
    meta.modified().ok().map(DateTime::<Local>::from)
}

/// Extract the (kbps, percent) pair from the first rate line in the named
/// log. Missing/unreadable files and logs with no matching line all yield
/// `("0", "0")` so downstream formatting never branches on a null.
pub fn last_rate(dir: &Path, name: &str) -> (String, String) {
    let default = || ("0".to_string(), "0".to_string());
    let Ok(text) = std::fs::read_to_string(dir.join(name)) else {
        return default();
    };
    match rate_regex().captures(&text) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => default(),
    }
}
