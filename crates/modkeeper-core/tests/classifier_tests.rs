use std::fs;
use std::path::Path;
use tempfile::tempdir;

use modkeeper_core::classifier::Classifier;
use modkeeper_core::scanner::ScannedEntry;
use modkeeper_core::{Category, FileStatus};

/// A minimal well-formed package body, comfortably above the tiny threshold.
fn dbpf_bytes(filler: u8) -> Vec<u8> {
    let mut data = b"DBPF".to_vec();
    data.extend(std::iter::repeat(filler).take(2044));
    data
}

fn entry_for(path: &Path) -> ScannedEntry {
    let metadata = fs::metadata(path).unwrap();
    ScannedEntry {
        path: path.to_path_buf(),
        size: metadata.len(),
        modified: metadata.modified().unwrap(),
    }
}

#[test]
fn test_garbage_name_beats_everything() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join(".DS_Store");
    fs::write(&path, b"junk").unwrap();

    let mut classifier = Classifier::new();
    let file = classifier.classify(&entry_for(&path));
    assert_eq!(file.status, FileStatus::Garbage);
}

#[test]
fn test_tiny_file_is_never_valid() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("small_mod.package");
    fs::write(&path, vec![0u8; 500]).unwrap();

    let mut classifier = Classifier::new();
    let file = classifier.classify(&entry_for(&path));
    assert_eq!(file.status, FileStatus::Tiny);
}

#[test]
fn test_tiny_beats_archive() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("stub.zip");
    fs::write(&path, vec![0u8; 200]).unwrap();

    let mut classifier = Classifier::new();
    let file = classifier.classify(&entry_for(&path));
    assert_eq!(file.status, FileStatus::Tiny);
}

#[test]
fn test_duplicate_first_seen_wins() {
    let tmp = tempdir().unwrap();
    let first = tmp.path().join("aaa_mod.package");
    let second = tmp.path().join("bbb_mod.package");
    fs::write(&first, dbpf_bytes(0xAA)).unwrap();
    fs::write(&second, dbpf_bytes(0xAA)).unwrap();

    let mut classifier = Classifier::new();
    let kept = classifier.classify(&entry_for(&first));
    let dupe = classifier.classify(&entry_for(&second));

    assert_eq!(kept.status, FileStatus::Valid);
    assert_eq!(dupe.status, FileStatus::Duplicate);
    assert_eq!(dupe.duplicate_of.as_deref(), Some(first.as_path()));
}

#[test]
fn test_different_content_is_not_duplicate() {
    let tmp = tempdir().unwrap();
    let first = tmp.path().join("aaa_mod.package");
    let second = tmp.path().join("bbb_mod.package");
    fs::write(&first, dbpf_bytes(0xAA)).unwrap();
    fs::write(&second, dbpf_bytes(0xBB)).unwrap();

    let mut classifier = Classifier::new();
    assert_eq!(
        classifier.classify(&entry_for(&first)).status,
        FileStatus::Valid
    );
    assert_eq!(
        classifier.classify(&entry_for(&second)).status,
        FileStatus::Valid
    );
}

#[test]
fn test_package_without_magic_is_corrupt() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("broken.package");
    fs::write(&path, vec![0u8; 2048]).unwrap();

    let mut classifier = Classifier::new();
    let file = classifier.classify(&entry_for(&path));
    assert_eq!(file.status, FileStatus::Corrupt);
}

#[test]
fn test_ts4script_skips_magic_check() {
    // Script mods are zip containers, not DBPF packages.
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("helper.ts4script");
    fs::write(&path, vec![0x50u8; 2048]).unwrap();

    let mut classifier = Classifier::new();
    let file = classifier.classify(&entry_for(&path));
    assert_eq!(file.status, FileStatus::Valid);
    assert_eq!(file.category, Category::Scripts);
}

#[test]
fn test_archive_extension_is_archive_status() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("bundle.zip");
    fs::write(&path, vec![0x42u8; 2048]).unwrap();

    let mut classifier = Classifier::new();
    let file = classifier.classify(&entry_for(&path));
    assert_eq!(file.status, FileStatus::Archive);
}

#[test]
fn test_valid_file_carries_hash_and_category() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("oak_kitchen_counter.package");
    fs::write(&path, dbpf_bytes(0xCC)).unwrap();

    let mut classifier = Classifier::new();
    let file = classifier.classify(&entry_for(&path));
    assert_eq!(file.status, FileStatus::Valid);
    assert_eq!(file.category, Category::BuildKitchen);
    assert!(file.hash.is_some());
}
