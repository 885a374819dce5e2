use crate::error::Error;
use crate::model::{FileStatus, ModFile};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const TGI_MARKER: &[u8] = b"TGIN";
const TGI_KEY_LENGTH: usize = 16;

/// A pair of package files claiming the same in-game resource identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPair {
    pub file: String,
    pub conflicts_with: String,
}

/// Read the TGI resource keys embedded in a package file. Unreadable files
/// yield an empty set; the caller treats them as conflict-free.
pub fn read_tgi_keys(path: &Path) -> HashSet<Vec<u8>> {
    let mut keys = HashSet::new();
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            warn!("Error reading TGI keys from {}: {}", path.display(), err);
            return keys;
        }
    };

    let mut offset = 0;
    while let Some(index) = find_marker(&data[offset..]) {
        let start = offset + index;
        if start + TGI_KEY_LENGTH > data.len() {
            break;
        }
        keys.insert(data[start..start + TGI_KEY_LENGTH].to_vec());
        offset = start + 1;
    }

    keys
}

fn find_marker(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(TGI_MARKER.len())
        .position(|window| window == TGI_MARKER)
}

/// Detect valid packages claiming the same TGI key. The first claimant in
/// path order keeps the key; later claimants are reported as conflict pairs.
pub fn detect_conflicts(files: &[ModFile]) -> Vec<ConflictPair> {
    let mut packages: Vec<&ModFile> = files
        .iter()
        .filter(|file| {
            file.status == FileStatus::Valid
                && file
                    .path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("package"))
                    .unwrap_or(false)
        })
        .collect();
    packages.sort_by(|a, b| a.path.cmp(&b.path));

    let mut tgi_map: HashMap<Vec<u8>, PathBuf> = HashMap::new();
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    let mut conflicts = Vec::new();

    for package in packages {
        for key in read_tgi_keys(&package.path) {
            match tgi_map.get(&key) {
                Some(first) => {
                    let pair = (file_name(&package.path), file_name(first));
                    if seen_pairs.insert(pair.clone()) {
                        conflicts.push(ConflictPair {
                            file: pair.0,
                            conflicts_with: pair.1,
                        });
                    }
                }
                None => {
                    tgi_map.insert(key, package.path.clone());
                }
            }
        }
    }

    conflicts
}

/// Names of all files the classifier marked corrupt.
pub fn broken_files(files: &[ModFile]) -> Vec<String> {
    let mut broken: Vec<String> = files
        .iter()
        .filter(|file| file.status == FileStatus::Corrupt)
        .map(|file| file_name(&file.path))
        .collect();
    broken.sort();
    broken
}

pub fn write_conflict_report(conflicts: &[ConflictPair], output: &Path) -> Result<(), Error> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(["mod", "conflicts_with"])?;
    for pair in conflicts {
        writer.write_record([&pair.file, &pair.conflicts_with])?;
    }
    writer.flush()?;

    if conflicts.is_empty() {
        info!("No TGI conflicts found.");
    } else {
        info!(
            "Found {} TGI conflict pair(s), exported to {}",
            conflicts.len(),
            output.display()
        );
    }
    Ok(())
}

pub fn write_broken_report(broken: &[String], output: &Path) -> Result<(), Error> {
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(["broken_mod"])?;
    for name in broken {
        writer.write_record([name])?;
    }
    writer.flush()?;

    if broken.is_empty() {
        info!("No broken mods found.");
    } else {
        info!(
            "Found {} broken mod(s), exported to {}",
            broken.len(),
            output.display()
        );
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
