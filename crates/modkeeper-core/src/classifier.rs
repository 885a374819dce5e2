use crate::hasher;
use crate::model::{Category, FileStatus, ModFile};
use crate::scanner::ScannedEntry;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Files below this size are never valid mods.
pub const TINY_THRESHOLD: u64 = 1024;

const GARBAGE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z"];
const MOD_EXTENSIONS: &[&str] = &["package", "ts4script"];
const DBPF_MAGIC: &[u8; 4] = b"DBPF";

/// Keyword table checked in order; first hit wins. Entries starting with a
/// dot match the file extension instead of the name.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::BuildKitchen,
        &["kitchen", "fridge", "oven", "counter", "cabinet"],
    ),
    (Category::BuildBathroom, &["bath", "toilet", "shower", "sink"]),
    (Category::BuildBedroom, &["bed", "dresser", "nightstand"]),
    (Category::DecorPlants, &["plant", "flower", "foliage"]),
    (Category::CasClothing, &["top", "dress", "pants", "skirt"]),
    (Category::CasHair, &["hair", "hairstyle", "pony"]),
    (Category::CasAnimations, &["pose", "animation", "preset"]),
    (Category::GameplayWickedWhims, &["wickedwhims"]),
    (Category::GameplayMccc, &["mccommand", "mccc"]),
    (Category::Scripts, &[".ts4script"]),
];

/// Assigns each scanned file exactly one terminal status.
///
/// Precedence, first match wins: garbage name > tiny > duplicate > corrupt >
/// archive > valid. Duplicates are first-seen-wins in scan order; the hash
/// state persists across archive re-scan rounds so an extracted copy of an
/// already-seen file is still caught.
pub struct Classifier {
    seen_hashes: HashMap<String, PathBuf>,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            seen_hashes: HashMap::new(),
        }
    }

    pub fn classify(&mut self, entry: &ScannedEntry) -> ModFile {
        let mut file = ModFile {
            path: entry.path.clone(),
            size: entry.size,
            modified: entry.modified,
            hash: None,
            category: category_for(&entry.path),
            status: FileStatus::Valid,
            duplicate_of: None,
        };

        if is_garbage(&entry.path) {
            file.status = FileStatus::Garbage;
            return file;
        }

        if entry.size < TINY_THRESHOLD {
            file.status = FileStatus::Tiny;
            return file;
        }

        match hasher::content_hash(&entry.path) {
            Ok(hash) => {
                if let Some(first) = self.seen_hashes.get(&hash) {
                    debug!(
                        "{} duplicates {}",
                        entry.path.display(),
                        first.display()
                    );
                    file.hash = Some(hash);
                    file.duplicate_of = Some(first.clone());
                    file.status = FileStatus::Duplicate;
                    return file;
                }
                self.seen_hashes.insert(hash.clone(), entry.path.clone());
                file.hash = Some(hash);
            }
            Err(err) => {
                error!("Error reading {}: {}", entry.path.display(), err);
                file.status = FileStatus::Corrupt;
                return file;
            }
        }

        if is_dbpf_package(&entry.path) && !has_dbpf_magic(&entry.path) {
            file.status = FileStatus::Corrupt;
            return file;
        }

        if is_archive(&entry.path) {
            file.status = FileStatus::Archive;
            return file;
        }

        file
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Determine the category folder for a file based on its name or extension.
pub fn category_for(path: &Path) -> Category {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let ext = extension_lower(path);

    for (category, keywords) in CATEGORY_KEYWORDS {
        for keyword in *keywords {
            if let Some(wanted_ext) = keyword.strip_prefix('.') {
                if ext == wanted_ext {
                    return *category;
                }
            } else if name.contains(keyword) {
                return *category;
            }
        }
    }

    Category::Unsorted
}

pub fn is_garbage(path: &Path) -> bool {
    path.file_name()
        .map(|name| GARBAGE_NAMES.contains(&name.to_string_lossy().as_ref()))
        .unwrap_or(false)
}

pub fn is_archive(path: &Path) -> bool {
    ARCHIVE_EXTENSIONS.contains(&extension_lower(path).as_str())
}

/// True for the file types the game actually loads as mods.
pub fn is_mod_file(path: &Path) -> bool {
    MOD_EXTENSIONS.contains(&extension_lower(path).as_str())
}

fn is_dbpf_package(path: &Path) -> bool {
    // .ts4script files are zip containers, not DBPF packages.
    extension_lower(path) == "package"
}

fn has_dbpf_magic(path: &Path) -> bool {
    let mut head = [0u8; 4];
    match File::open(path).and_then(|mut file| file.read_exact(&mut head)) {
        Ok(()) => &head == DBPF_MAGIC,
        Err(_) => false,
    }
}

fn extension_lower(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_by_keyword() {
        assert_eq!(
            category_for(Path::new("modern_kitchen_counter.package")),
            Category::BuildKitchen
        );
        assert_eq!(
            category_for(Path::new("SummerDress.package")),
            Category::CasClothing
        );
        assert_eq!(
            category_for(Path::new("wickedwhims_core.package")),
            Category::GameplayWickedWhims
        );
    }

    #[test]
    fn test_category_by_extension() {
        assert_eq!(
            category_for(Path::new("mc_cmd_center.ts4script")),
            Category::Scripts
        );
    }

    #[test]
    fn test_category_fallback() {
        assert_eq!(
            category_for(Path::new("mystery_mod.package")),
            Category::Unsorted
        );
    }

    #[test]
    fn test_keyword_order_first_hit_wins() {
        // "dress" (clothing) appears in the table before "hair".
        assert_eq!(
            category_for(Path::new("dress_with_hair_clip.package")),
            Category::CasClothing
        );
    }

    #[test]
    fn test_garbage_names() {
        assert!(is_garbage(Path::new("/mods/.DS_Store")));
        assert!(is_garbage(Path::new("Thumbs.db")));
        assert!(!is_garbage(Path::new("mod.package")));
    }

    #[test]
    fn test_archive_extensions() {
        assert!(is_archive(Path::new("bundle.zip")));
        assert!(is_archive(Path::new("bundle.RAR")));
        assert!(is_archive(Path::new("bundle.7z")));
        assert!(!is_archive(Path::new("mod.ts4script")));
    }
}
