use crate::classifier;
use crate::error::Error;
use crate::model::{FileStatus, ModFile};
use chrono::{DateTime, Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Published metadata for a mod file, keyed by file name in the metadata map.
#[derive(Debug, Clone, Deserialize)]
pub struct KnownVersion {
    pub latest: String,
    #[serde(default)]
    pub url: Option<String>,
}

pub type KnownVersions = HashMap<String, KnownVersion>;

/// A mod whose on-disk copy predates its published release date.
#[derive(Debug, Clone)]
pub struct OutdatedMod {
    pub path: PathBuf,
    pub name: String,
    pub installed: NaiveDate,
    pub latest: NaiveDate,
    pub url: Option<String>,
}

pub fn load_known_versions(path: &Path) -> Result<KnownVersions, Error> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Refresh the local version-metadata file from a remote URL.
pub fn refresh_known_versions(url: &str, dest: &Path) -> Result<(), Error> {
    let body = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    fs::write(dest, &body)?;
    info!("Updated {} from {}", dest.display(), url);
    Ok(())
}

/// Compare each known mod file's modification date against its published
/// latest date. Entries with unparseable dates are warned about and skipped.
pub fn check_versions(files: &[ModFile], known: &KnownVersions) -> Vec<OutdatedMod> {
    let mut outdated = Vec::new();

    for file in files {
        if file.status != FileStatus::Valid || !classifier::is_mod_file(&file.path) {
            continue;
        }
        let name = match file.path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let Some(version) = known.get(&name) else {
            continue;
        };

        let latest = match NaiveDate::parse_from_str(&version.latest, "%Y-%m-%d") {
            Ok(date) => date,
            Err(err) => {
                warn!("Bad date '{}' for {}: {}", version.latest, name, err);
                continue;
            }
        };

        let installed = DateTime::<Local>::from(file.modified).date_naive();
        if installed < latest {
            outdated.push(OutdatedMod {
                path: file.path.clone(),
                name,
                installed,
                latest,
                url: version.url.clone(),
            });
        }
    }

    outdated
}

/// Download a replacement for an outdated mod over the stale file.
pub fn download_update(url: &str, dest: &Path) -> Result<(), Error> {
    let body = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    fs::write(dest, &body)?;
    info!("Downloaded update for {}", dest.display());
    Ok(())
}
