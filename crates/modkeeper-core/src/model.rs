use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// Folder a valid mod file is sorted into, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    BuildKitchen,
    BuildBathroom,
    BuildBedroom,
    DecorPlants,
    CasClothing,
    CasHair,
    CasAnimations,
    GameplayWickedWhims,
    GameplayMccc,
    Scripts,
    Unsorted,
}

impl Category {
    /// The on-disk folder name under the mods root.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Category::BuildKitchen => "Build-Kitchen",
            Category::BuildBathroom => "Build-Bathroom",
            Category::BuildBedroom => "Build-Bedroom",
            Category::DecorPlants => "Decor-Plants",
            Category::CasClothing => "CAS-Clothing",
            Category::CasHair => "CAS-Hair",
            Category::CasAnimations => "CAS-Animations",
            Category::GameplayWickedWhims => "Gameplay-WickedWhims",
            Category::GameplayMccc => "Gameplay-MCCommand",
            Category::Scripts => "Scripts",
            Category::Unsorted => "_Unsorted",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::BuildKitchen,
            Category::BuildBathroom,
            Category::BuildBedroom,
            Category::DecorPlants,
            Category::CasClothing,
            Category::CasHair,
            Category::CasAnimations,
            Category::GameplayWickedWhims,
            Category::GameplayMccc,
            Category::Scripts,
            Category::Unsorted,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Terminal status assigned to each scanned file. Exactly one per file per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileStatus {
    Valid,
    Garbage,
    Tiny,
    Duplicate,
    Corrupt,
    Archive,
}

/// A regular file discovered under the mods root.
#[derive(Debug, Clone)]
pub struct ModFile {
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    /// Hex content digest, absent when the file could not be read.
    pub hash: Option<String>,
    pub category: Category,
    pub status: FileStatus,
    /// For duplicates, the first-seen copy that was kept.
    pub duplicate_of: Option<PathBuf>,
}

/// Snapshot of a valid mod file written to the exported inventory.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntry {
    pub name: String,
    pub path: String,
    pub size_kb: f64,
    pub hash: String,
    pub category: String,
    pub added: String,
}

/// Whether the pipeline mutates the tree or only reports what it would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Apply,
    DryRun,
}

impl RunMode {
    pub fn is_apply(self) -> bool {
        matches!(self, RunMode::Apply)
    }
}
