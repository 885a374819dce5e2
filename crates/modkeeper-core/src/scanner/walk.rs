use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{error, warn};
use walkdir::WalkDir;

/// A regular file found under the mods root.
#[derive(Debug, Clone)]
pub struct ScannedEntry {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// Walk a directory tree and return every regular file, sorted by file name
/// so classification order does not depend on filesystem directory ordering.
///
/// Skips symlinks, glob-ignored paths, the Resource.cfg this tool writes at
/// the root, and anything under the quarantine directory (relevant when the
/// quarantine folder is nested inside the mods root). Permission errors on
/// subdirectories are logged and skipped; an unreadable root is fatal.
pub fn collect_files(
    root: &Path,
    ignore_globs: &[String],
    quarantine_dir: &Path,
) -> io::Result<Vec<ScannedEntry>> {
    // An unreadable or missing root aborts the run.
    fs::read_dir(root)?;

    let ignore_patterns: Vec<Pattern> = ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(pattern) => Some(pattern),
            Err(err) => {
                error!("Invalid glob pattern '{}': {}", glob, err);
                None
            }
        })
        .collect();

    let resource_cfg = root.join("Resource.cfg");
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };

        if entry.file_type().is_dir() || entry.path_is_symlink() {
            continue;
        }

        let path = entry.path();
        if path == resource_cfg || path.starts_with(quarantine_dir) {
            continue;
        }
        if ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
        {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                continue;
            }
        };

        entries.push(ScannedEntry {
            path: path.to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }

    Ok(entries)
}
