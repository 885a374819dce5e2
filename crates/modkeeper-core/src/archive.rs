use crate::error::Error;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Extract an archive into `dest`, dispatching on its extension.
/// Returns the number of files extracted.
pub fn extract(archive: &Path, dest: &Path) -> Result<usize, Error> {
    fs::create_dir_all(dest)?;

    let ext = archive
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let count = match ext.as_str() {
        "zip" => extract_zip(archive, dest)?,
        "7z" => extract_7z(archive, dest)?,
        "rar" => extract_rar(archive, dest)?,
        other => {
            return Err(Error::Other(format!(
                "unrecognized archive format: .{other}"
            )))
        }
    };

    debug!(
        "Extracted {} files from {} into {}",
        count,
        archive.display(),
        dest.display()
    );
    Ok(count)
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, Error> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut count = 0;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        if is_ignored_entry(&relative) {
            continue;
        }

        let out_path = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)?;
        io::copy(&mut entry, &mut out_file)?;
        count += 1;
    }

    Ok(count)
}

fn extract_7z(archive: &Path, dest: &Path) -> Result<usize, Error> {
    sevenz_rust::decompress_file(archive, dest)
        .map_err(|err| Error::Other(format!("failed to extract {}: {}", archive.display(), err)))?;
    Ok(count_extracted(dest))
}

fn extract_rar(archive: &Path, dest: &Path) -> Result<usize, Error> {
    let archive_str = archive
        .to_str()
        .ok_or_else(|| Error::Other("rar path is not valid UTF-8".to_string()))?;
    let dest_str = dest
        .to_str()
        .ok_or_else(|| Error::Other("destination path is not valid UTF-8".to_string()))?;

    rar::Archive::extract_all(archive_str, dest_str, "").map_err(|err| {
        Error::Other(format!("failed to extract {}: {:?}", archive.display(), err))
    })?;

    Ok(count_extracted(dest))
}

fn count_extracted(dest: &Path) -> usize {
    WalkDir::new(dest)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .count()
}

fn is_ignored_entry(path: &Path) -> bool {
    path.components().any(|component| {
        let part = component.as_os_str().to_string_lossy();
        part.eq_ignore_ascii_case("__MACOSX") || part == ".git"
    })
}
