use crate::error::Error;
use chrono::Local;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Timestamped file name for a backup of the mods tree.
pub fn backup_file_name() -> String {
    format!("ModsBackup-{}.zip", Local::now().format("%Y%m%d-%H%M%S"))
}

/// Archive every regular file under `src` into a zip at `dst`, then verify
/// the result by re-opening it and comparing entry counts. Any failure is
/// fatal to the run: mutation must never proceed without a verified backup.
pub fn create_backup(src: &Path, dst: &Path) -> Result<usize, Error> {
    let file = File::create(dst)
        .map_err(|err| Error::Backup(format!("cannot create {}: {}", dst.display(), err)))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut archived = 0usize;
    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            Error::Backup(format!("unreadable entry under {}: {}", src.display(), err))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| Error::Backup(err.to_string()))?;

        writer
            .start_file(relative.to_string_lossy().replace('\\', "/"), options)
            .map_err(|err| Error::Backup(err.to_string()))?;
        let mut input = File::open(entry.path()).map_err(|err| {
            Error::Backup(format!("cannot read {}: {}", entry.path().display(), err))
        })?;
        io::copy(&mut input, &mut writer).map_err(|err| Error::Backup(err.to_string()))?;
        archived += 1;
    }

    writer
        .finish()
        .map_err(|err| Error::Backup(err.to_string()))?;

    verify_backup(dst, archived)?;
    info!("Backup written to {} ({} files)", dst.display(), archived);
    Ok(archived)
}

fn verify_backup(dst: &Path, expected: usize) -> Result<(), Error> {
    let file = File::open(dst)
        .map_err(|err| Error::Backup(format!("cannot reopen backup: {}", err)))?;
    let archive = ZipArchive::new(file)
        .map_err(|err| Error::Backup(format!("backup archive unreadable: {}", err)))?;

    if archive.len() != expected {
        return Err(Error::Backup(format!(
            "entry count mismatch: archived {} files but {} holds {}",
            expected,
            dst.display(),
            archive.len()
        )));
    }
    Ok(())
}
