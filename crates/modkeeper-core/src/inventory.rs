use crate::classifier;
use crate::error::Error;
use crate::model::{FileStatus, InventoryEntry, ModFile};
use chrono::{DateTime, Local};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Project the valid mod files into inventory entries, sorted by path.
pub fn build_inventory(files: &[ModFile], mods_dir: &Path) -> Vec<InventoryEntry> {
    let mut entries: Vec<InventoryEntry> = files
        .iter()
        .filter(|file| file.status == FileStatus::Valid && classifier::is_mod_file(&file.path))
        .map(|file| {
            let relative = file.path.strip_prefix(mods_dir).unwrap_or(&file.path);
            InventoryEntry {
                name: file
                    .path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: relative.to_string_lossy().into_owned(),
                size_kb: (file.size as f64 / 1024.0 * 100.0).round() / 100.0,
                hash: file.hash.clone().unwrap_or_default(),
                category: file.category.to_string(),
                added: DateTime::<Local>::from(file.modified).to_rfc3339(),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries
}

pub fn export_json(entries: &[InventoryEntry], output: &Path) -> Result<(), Error> {
    let file = File::create(output)?;
    serde_json::to_writer_pretty(file, entries)?;
    info!("Exported mod inventory to {}", output.display());
    Ok(())
}

pub fn export_csv(entries: &[InventoryEntry], output: &Path) -> Result<(), Error> {
    let mut writer = csv::Writer::from_path(output)?;
    for entry in entries {
        writer.serialize(entry)?;
    }
    writer.flush()?;
    info!("Exported mod inventory to {}", output.display());
    Ok(())
}
