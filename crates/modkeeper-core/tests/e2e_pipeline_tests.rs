use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

use modkeeper_core::{AppConfig, Error, PipelineEngine, RunMode, SilentReporter};

fn dbpf_bytes(filler: u8) -> Vec<u8> {
    let mut data = b"DBPF".to_vec();
    data.extend(std::iter::repeat(filler).take(2044));
    data
}

fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    // Stored, so the archive stays above the tiny threshold.
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        mods_dir: root.join("Mods"),
        backup_dir: root.join("Backups"),
        quarantine_dir: root.join("Quarantine"),
        report_dir: root.join("Reports"),
        ignore_patterns: vec![],
        known_versions_path: None,
        known_versions_url: None,
        resource_cfg_depth: 5,
    }
}

/// Build a mods tree exercising every classification:
///   Mods/
///     .DS_Store                  garbage
///     aaa_counter.package        valid (Build-Kitchen), kept copy
///     bbb_counter.package        duplicate of aaa_counter.package
///     broken.package             corrupt (no DBPF magic)
///     bundle.zip                 archive holding a wickedwhims package
///     notes.txt                  valid non-mod file, stays in place
///     tiny_mod.package           tiny
fn create_test_tree(mods: &Path) {
    fs::create_dir_all(mods).unwrap();
    fs::write(mods.join(".DS_Store"), b"junk").unwrap();
    fs::write(mods.join("aaa_counter.package"), dbpf_bytes(0xAA)).unwrap();
    fs::write(mods.join("bbb_counter.package"), dbpf_bytes(0xAA)).unwrap();
    fs::write(mods.join("broken.package"), vec![0u8; 2048]).unwrap();
    write_zip(
        &mods.join("bundle.zip"),
        &[("wickedwhims_patch.package", &dbpf_bytes(0xBB))],
    );
    fs::write(mods.join("notes.txt"), vec![b'x'; 1500]).unwrap();
    fs::write(mods.join("tiny_mod.package"), vec![0u8; 500]).unwrap();
}

#[test]
fn test_full_pipeline_apply() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    let mods = config.mods_dir.clone();
    create_test_tree(&mods);

    let engine = PipelineEngine::new(config.clone());
    let result = engine.run(RunMode::Apply, &SilentReporter).unwrap();

    // Backup was taken first and holds every file present at run start.
    let backup_path = result.backup_path.clone().expect("backup should exist");
    let backup = zip::ZipArchive::new(fs::File::open(&backup_path).unwrap()).unwrap();
    assert_eq!(backup.len(), 7, "backup should contain the 7 original files");

    // Garbage is deleted, not quarantined.
    assert!(!mods.join(".DS_Store").exists());
    assert!(!config.quarantine_dir.join(".DS_Store").exists());

    // Tiny, duplicate, and corrupt files land in quarantine.
    assert!(config.quarantine_dir.join("tiny_mod.package").exists());
    assert!(config.quarantine_dir.join("bbb_counter.package").exists());
    assert!(config.quarantine_dir.join("broken.package").exists());

    // The kept copy is sorted into its keyword category.
    assert!(mods.join("Build-Kitchen/aaa_counter.package").exists());
    assert!(!mods.join("aaa_counter.package").exists());

    // The archive was extracted, deleted, and its content classified and
    // sorted in the same run.
    assert!(!mods.join("bundle.zip").exists());
    assert!(mods
        .join("Gameplay-WickedWhims/wickedwhims_patch.package")
        .exists());

    // Non-mod files stay where they are.
    assert!(mods.join("notes.txt").exists());

    // Load order is rewritten to the configured depth.
    let cfg = fs::read_to_string(mods.join("Resource.cfg")).unwrap();
    assert!(cfg.starts_with("Priority 500"));
    assert!(cfg.contains("PackedFile */*/*/*/*.package"));

    // Inventory lists exactly the surviving valid mod files.
    let json = fs::read_to_string(config.report_dir.join("ModsInventory.json")).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&json).unwrap();
    let names: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"aaa_counter.package"));
    assert!(names.contains(&"wickedwhims_patch.package"));
    assert!(config.report_dir.join("ModsInventory.csv").exists());

    // Broken report names the corrupt file.
    let broken = fs::read_to_string(config.report_dir.join("BrokenMods.csv")).unwrap();
    assert!(broken.contains("broken.package"));

    assert_eq!(result.garbage_removed, 1);
    assert_eq!(result.tiny_quarantined, 1);
    assert_eq!(result.duplicates_quarantined, 1);
    assert_eq!(result.corrupt_quarantined, 1);
    assert_eq!(result.archives_extracted, 1);
    assert_eq!(result.moved_to_category, 2);
    assert_eq!(result.broken_files, 1);
}

#[test]
fn test_second_run_is_idempotent() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    create_test_tree(&config.mods_dir);

    let engine = PipelineEngine::new(config.clone());
    engine.run(RunMode::Apply, &SilentReporter).unwrap();
    let second = engine.run(RunMode::Apply, &SilentReporter).unwrap();

    assert_eq!(second.garbage_removed, 0);
    assert_eq!(second.tiny_quarantined, 0);
    assert_eq!(second.duplicates_quarantined, 0);
    assert_eq!(second.corrupt_quarantined, 0);
    assert_eq!(second.archives_extracted, 0);
    assert_eq!(second.moved_to_category, 0);

    // The cleaned tree keeps its shape.
    assert!(config
        .mods_dir
        .join("Build-Kitchen/aaa_counter.package")
        .exists());
    assert!(config
        .mods_dir
        .join("Gameplay-WickedWhims/wickedwhims_patch.package")
        .exists());
}

#[test]
fn test_dry_run_mutates_nothing() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    let mods = config.mods_dir.clone();
    create_test_tree(&mods);

    let engine = PipelineEngine::new(config.clone());
    let result = engine.run(RunMode::DryRun, &SilentReporter).unwrap();

    assert!(result.backup_path.is_none());
    assert!(!config.quarantine_dir.exists());
    assert!(!mods.join("Resource.cfg").exists());

    // Every original file is untouched.
    for name in [
        ".DS_Store",
        "aaa_counter.package",
        "bbb_counter.package",
        "broken.package",
        "bundle.zip",
        "notes.txt",
        "tiny_mod.package",
    ] {
        assert!(mods.join(name).exists(), "{} should be untouched", name);
    }

    // The dry run still reports what it would have done.
    assert_eq!(result.garbage_removed, 1);
    assert_eq!(result.tiny_quarantined, 1);
    assert_eq!(result.duplicates_quarantined, 1);
    assert_eq!(result.corrupt_quarantined, 1);
    assert_eq!(result.archives_extracted, 1);
}

#[test]
fn test_backup_failure_aborts_before_mutation() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(tmp.path());
    create_test_tree(&config.mods_dir);

    // The backup directory's parent is a file, so creating it must fail.
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, b"in the way").unwrap();
    config.backup_dir = blocker.join("Backups");

    let engine = PipelineEngine::new(config.clone());
    let err = engine.run(RunMode::Apply, &SilentReporter).unwrap_err();
    assert!(matches!(err, Error::Backup(_)));

    // Nothing was touched, not even garbage.
    assert!(config.mods_dir.join(".DS_Store").exists());
    assert!(config.mods_dir.join("tiny_mod.package").exists());
    assert!(!config.quarantine_dir.exists());
}

#[test]
fn test_missing_mods_dir_is_fatal() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());

    let engine = PipelineEngine::new(config);
    assert!(engine.run(RunMode::DryRun, &SilentReporter).is_err());
}

#[test]
fn test_folder_names_are_standardized() {
    let tmp = tempdir().unwrap();
    let config = test_config(tmp.path());
    let mods = config.mods_dir.clone();
    fs::create_dir_all(mods.join("build kitchen")).unwrap();
    fs::write(
        mods.join("build kitchen/oak_counter.package"),
        dbpf_bytes(0xAA),
    )
    .unwrap();

    let engine = PipelineEngine::new(config);
    engine.run(RunMode::Apply, &SilentReporter).unwrap();

    assert!(!mods.join("build kitchen").exists());
    assert!(mods.join("Build-Kitchen/oak_counter.package").exists());
}

#[test]
fn test_ignore_patterns_skip_files() {
    let tmp = tempdir().unwrap();
    let mut config = test_config(tmp.path());
    config.ignore_patterns = vec!["**/keep_as_is/**".to_string()];
    let mods = config.mods_dir.clone();
    fs::create_dir_all(mods.join("keep_as_is")).unwrap();
    fs::write(mods.join("keep_as_is/tiny.package"), vec![0u8; 100]).unwrap();

    let engine = PipelineEngine::new(config.clone());
    let result = engine.run(RunMode::Apply, &SilentReporter).unwrap();

    assert_eq!(result.tiny_quarantined, 0);
    assert!(mods.join("keep_as_is/tiny.package").exists());
}
