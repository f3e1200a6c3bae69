use log::debug;
use regex::Regex;
use std::path::Path;

use anyhow::{Context, Result};

/// List customer directories under `basepath`.
///
/// Only directory entries whose full name matches `pattern` count; anything
/// in `ignore` is dropped by exact name. Entries that fail to stat are
/// skipped — a permission error or race-deleted entry never aborts the run.
pub fn list_customers(basepath: &Path, pattern: &Regex, ignore: &[String]) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(basepath)
        .with_context(|| format!("cannot list basepath {}", basepath.display()))?;
    Ok(matching_dirs(entries, pattern)
        .into_iter()
        .filter(|name| !ignore.iter().any(|ig| ig == name))
        .collect())
}

/// List host directories under one customer. An unreadable customer
/// directory yields an empty list, not an error.
pub fn list_hosts(basepath: &Path, customer: &str, pattern: &Regex) -> Vec<String> {
    let dir = basepath.join(customer);
    match std::fs::read_dir(&dir) {
        Ok(entries) => matching_dirs(entries, pattern),
        Err(err) => {
            debug!("skipping customer dir {}: {}", dir.display(), err);
            Vec::new()
        }
    }
}

fn matching_dirs(entries: std::fs::ReadDir, pattern: &Regex) -> Vec<String> {
    let mut out = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { continue };
        // file_type() does not follow symlinks, so a symlinked dir is not
        // treated as a directory entry here.
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => {}
            Ok(_) => continue,
            Err(err) => {
                debug!("skipping {}: {}", entry.path().display(), err);
                continue;
            }
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!("skipping non-UTF-8 entry under {}", entry.path().display());
            continue;
        };
        if pattern.is_match(&name) {
            out.push(name);
        }
    }
    out
}
