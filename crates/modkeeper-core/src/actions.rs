use crate::classifier;
use crate::model::{Category, FileStatus, ModFile, RunMode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome counters for the action pass.
#[derive(Debug, Default, Clone)]
pub struct ActionSummary {
    pub garbage_removed: usize,
    pub tiny_quarantined: usize,
    pub duplicates_quarantined: usize,
    pub corrupt_quarantined: usize,
    pub moved_to_category: usize,
}

impl ActionSummary {
    pub fn total(&self) -> usize {
        self.garbage_removed
            + self.tiny_quarantined
            + self.duplicates_quarantined
            + self.corrupt_quarantined
            + self.moved_to_category
    }
}

/// Apply each file's terminal status: delete garbage, quarantine tiny,
/// duplicate, and corrupt files, and sort valid mod files into their
/// category folders. Archives are handled by the engine's extraction rounds
/// before this pass runs. Per-file failures are logged, never fatal.
pub fn apply_actions(
    files: &mut [ModFile],
    mods_dir: &Path,
    quarantine_dir: &Path,
    mode: RunMode,
) -> ActionSummary {
    let mut summary = ActionSummary::default();

    for file in files.iter_mut() {
        match file.status {
            FileStatus::Garbage => {
                if mode.is_apply() {
                    match fs::remove_file(&file.path) {
                        Ok(()) => {
                            info!("Removed garbage file {}", file.path.display());
                            summary.garbage_removed += 1;
                        }
                        Err(err) => {
                            warn!("Failed to delete {}: {}", file.path.display(), err)
                        }
                    }
                } else {
                    info!("[dry] would delete garbage {}", file.path.display());
                    summary.garbage_removed += 1;
                }
            }
            FileStatus::Tiny => {
                if let Some(dest) = quarantine(&file.path, quarantine_dir, "tiny", mode) {
                    file.path = dest;
                    summary.tiny_quarantined += 1;
                }
            }
            FileStatus::Duplicate => {
                if let Some(dest) = quarantine(&file.path, quarantine_dir, "duplicate", mode) {
                    file.path = dest;
                    summary.duplicates_quarantined += 1;
                }
            }
            FileStatus::Corrupt => {
                if let Some(dest) = quarantine(&file.path, quarantine_dir, "corrupt", mode) {
                    file.path = dest;
                    summary.corrupt_quarantined += 1;
                }
            }
            FileStatus::Valid => {
                if let Some(dest) = move_to_category(file, mods_dir, mode) {
                    file.path = dest;
                    summary.moved_to_category += 1;
                }
            }
            // Extracted (or re-marked corrupt) before this pass.
            FileStatus::Archive => {}
        }
    }

    summary
}

/// Move a file into the quarantine folder. Returns the file's resulting
/// path, or None when nothing was done. Missing files are skipped silently
/// so a status applied earlier in the run can never act twice.
fn quarantine(path: &Path, quarantine_dir: &Path, reason: &str, mode: RunMode) -> Option<PathBuf> {
    if !path.exists() {
        return None;
    }

    if !mode.is_apply() {
        info!("[dry] would quarantine {} ({})", path.display(), reason);
        return Some(path.to_path_buf());
    }

    if let Err(err) = fs::create_dir_all(quarantine_dir) {
        warn!(
            "Cannot create quarantine dir {}: {}",
            quarantine_dir.display(),
            err
        );
        return None;
    }

    let dest = unique_destination(quarantine_dir, path);
    match move_file(path, &dest) {
        Ok(()) => {
            info!(
                "Quarantined {} file {} -> {}",
                reason,
                path.display(),
                dest.display()
            );
            Some(dest)
        }
        Err(err) => {
            warn!("Failed to quarantine {}: {}", path.display(), err);
            None
        }
    }
}

/// Sort a valid mod file into its category folder directly under the mods
/// root. Non-mod files (readmes, stray text files) stay where they are.
fn move_to_category(file: &ModFile, mods_dir: &Path, mode: RunMode) -> Option<PathBuf> {
    if !classifier::is_mod_file(&file.path) {
        return None;
    }

    let dest_dir = mods_dir.join(file.category.folder_name());
    if file.path.parent() == Some(dest_dir.as_path()) {
        return None;
    }

    if !mode.is_apply() {
        info!(
            "[dry] would move {} -> {}",
            file.path.display(),
            file.category.folder_name()
        );
        return Some(file.path.to_path_buf());
    }

    if let Err(err) = fs::create_dir_all(&dest_dir) {
        warn!("Cannot create {}: {}", dest_dir.display(), err);
        return None;
    }

    let dest = unique_destination(&dest_dir, &file.path);
    match move_file(&file.path, &dest) {
        Ok(()) => {
            info!("Sorted {} -> {}", file.path.display(), dest.display());
            Some(dest)
        }
        Err(err) => {
            warn!("Failed to move {}: {}", file.path.display(), err);
            None
        }
    }
}

/// Rename top-level folders whose name matches a category up to case and
/// spacing (e.g. "build kitchen" -> "Build-Kitchen").
pub fn standardize_folder_names(mods_dir: &Path, mode: RunMode) -> usize {
    let entries = match fs::read_dir(mods_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Cannot read {}: {}", mods_dir.display(), err);
            return 0;
        }
    };

    let mut renamed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let cleaned = name.trim().replace(' ', "-");

        for category in Category::all() {
            let folder = category.folder_name();
            if !cleaned.eq_ignore_ascii_case(folder) || name == folder {
                continue;
            }
            let target = mods_dir.join(folder);
            if target.exists() {
                break;
            }
            if mode.is_apply() {
                match fs::rename(&path, &target) {
                    Ok(()) => {
                        info!("Renamed folder {} -> {}", name, folder);
                        renamed += 1;
                    }
                    Err(err) => warn!("Failed to rename {}: {}", name, err),
                }
            } else {
                info!("[dry] would rename folder {} -> {}", name, folder);
                renamed += 1;
            }
            break;
        }
    }

    if renamed > 0 {
        info!("Standardized {} folder name(s)", renamed);
    }
    renamed
}

/// Rename, falling back to copy-and-delete across filesystems.
fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
    }
}

/// Pick a destination under `dir` for `src`, suffixing the name when a
/// different file already sits there.
fn unique_destination(dir: &Path, src: &Path) -> PathBuf {
    let name = src
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "unnamed".into());
    let mut dest = dir.join(&name);
    let mut counter = 1;

    while dest.exists() {
        let stem = src
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let candidate = match src.extension() {
            Some(ext) => format!("{} ({}).{}", stem, counter, ext.to_string_lossy()),
            None => format!("{} ({})", stem, counter),
        };
        dest = dir.join(candidate);
        counter += 1;
    }

    dest
}
