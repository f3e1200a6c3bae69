use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Filesystem-reported capacity and free space for the volume backing a
/// directory. On filesystems without per-directory backing volumes this is
/// whole-filesystem capacity, not a directory quota.
#[derive(Debug, Clone, Copy)]
pub struct SpaceProbe {
    pub allocated_bytes: u64,
    pub free_bytes: u64,
}

/// Aggregate from one recursive walk of a subtree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub dirs: u64,
    pub files: u64,
    pub total_bytes: u64,
}

/// statvfs probe: capacity = total blocks × fragment size, free = free
/// blocks × fragment size.
pub fn probe(path: &Path) -> Result<SpaceProbe> {
    let stat = nix::sys::statvfs::statvfs(path)
        .with_context(|| format!("statvfs failed for {}", path.display()))?;
    let frsize = stat.fragment_size() as u64;
    Ok(SpaceProbe {
        allocated_bytes: stat.blocks() as u64 * frsize,
        free_bytes: stat.blocks_free() as u64 * frsize,
    })
}

/// Sum file sizes under `path` in a single descent, one stat per entry.
///
/// Symlinks are never followed (cycle and double-count guard) and entries
/// that fail to stat are skipped. Unreadable directories contribute nothing.
pub fn used_bytes_by_walk(path: &Path) -> WalkStats {
    let mut stats = WalkStats::default();
    walk_dir(path, &mut stats);
    stats
}

fn walk_dir(dir: &Path, stats: &mut WalkStats) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("walk skipping {}: {}", dir.display(), err);
            return;
        }
    };
    for entry in entries {
        let Ok(entry) = entry else { continue };
        // DirEntry::metadata does not traverse symlinks, so a symlinked
        // directory counts as a plain (link-sized) entry and is not recursed.
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                debug!("walk skipping {}: {}", entry.path().display(), err);
                continue;
            }
        };
        if meta.is_dir() {
            stats.dirs += 1;
            walk_dir(&entry.path(), stats);
        } else {
            stats.files += 1;
            stats.total_bytes += meta.len();
        }
    }
}
