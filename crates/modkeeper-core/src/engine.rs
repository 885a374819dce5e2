use crate::actions;
use crate::archive;
use crate::backup;
use crate::classifier::Classifier;
use crate::config::AppConfig;
use crate::error::Error;
use crate::inventory;
use crate::loadorder;
use crate::model::{FileStatus, ModFile, RunMode};
use crate::progress::ProgressReporter;
use crate::report;
use crate::scanner;
use crate::versions;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Bounds nested-archive extraction; an archive inside an archive is
/// extracted on a later round, up to this many rounds.
const MAX_EXTRACTION_ROUNDS: usize = 5;

pub struct PipelineEngine {
    config: AppConfig,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub mode: RunMode,
    pub backup_path: Option<PathBuf>,
    pub files_scanned: usize,
    pub garbage_removed: usize,
    pub tiny_quarantined: usize,
    pub duplicates_quarantined: usize,
    pub corrupt_quarantined: usize,
    pub archives_extracted: usize,
    pub moved_to_category: usize,
    pub conflict_pairs: usize,
    pub broken_files: usize,
    pub outdated_mods: usize,
    pub backup_duration: Duration,
    pub scan_duration: Duration,
    pub classify_duration: Duration,
    pub action_duration: Duration,
    pub report_duration: Duration,
}

impl PipelineEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run the full maintenance pipeline:
    /// 1. Backup the mods tree (apply mode; failure aborts the run)
    /// 2. Scan every file in stable order and classify it
    /// 3. Apply terminal statuses (delete, quarantine, extract, sort)
    /// 4. Rewrite Resource.cfg, export the inventory, write reports
    /// 5. Check installed mods against the known-versions metadata
    pub fn run(
        &self,
        mode: RunMode,
        reporter: &dyn ProgressReporter,
    ) -> Result<PipelineResult, Error> {
        let mods_dir = &self.config.mods_dir;
        if !mods_dir.is_dir() {
            return Err(Error::Other(format!(
                "mods directory not found: {}",
                mods_dir.display()
            )));
        }

        // Phase 1: backup. Nothing may mutate until the backup is verified.
        let backup_start = Instant::now();
        let mut backup_path = None;
        if mode.is_apply() {
            reporter.on_backup_start();
            fs::create_dir_all(&self.config.backup_dir).map_err(|err| {
                Error::Backup(format!(
                    "cannot create {}: {}",
                    self.config.backup_dir.display(),
                    err
                ))
            })?;
            let dst = self.config.backup_dir.join(backup::backup_file_name());
            let archived = backup::create_backup(mods_dir, &dst)?;
            reporter.on_backup_complete(archived, backup_start.elapsed().as_secs_f64());
            backup_path = Some(dst);
        } else {
            info!(
                "[dry] would create backup zip in {}",
                self.config.backup_dir.display()
            );
        }
        let backup_duration = backup_start.elapsed();

        actions::standardize_folder_names(mods_dir, mode);

        // Phase 2: scan.
        reporter.on_scan_start();
        let scan_start = Instant::now();
        let entries = scanner::collect_files(
            mods_dir,
            &self.config.ignore_patterns,
            &self.config.quarantine_dir,
        )?;
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(entries.len(), scan_duration.as_secs_f64());
        debug!(
            "Scan completed in {:.2}s, {} files",
            scan_duration.as_secs_f64(),
            entries.len()
        );

        // Phase 3: classify.
        let classify_start = Instant::now();
        reporter.on_classify_start(entries.len());
        let mut classifier = Classifier::new();
        let mut files: Vec<ModFile> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            files.push(classifier.classify(entry));
            reporter.on_classify_progress(index + 1, entries.len());
        }
        let classify_duration = classify_start.elapsed();
        reporter.on_classify_complete(files.len(), classify_duration.as_secs_f64());

        // Phase 4: act. Extraction rounds first, so extracted contents are
        // classified and sorted in the same run.
        reporter.on_action_start();
        let action_start = Instant::now();
        let archives_extracted =
            self.run_extraction_rounds(&mut files, &mut classifier, mode);
        let summary = actions::apply_actions(
            &mut files,
            mods_dir,
            &self.config.quarantine_dir,
            mode,
        );
        let action_duration = action_start.elapsed();
        reporter.on_action_complete(
            summary.total() + archives_extracted,
            action_duration.as_secs_f64(),
        );

        // Phase 5: load order.
        if mode.is_apply() {
            loadorder::rewrite_resource_cfg(mods_dir, self.config.resource_cfg_depth)?;
        } else {
            info!("[dry] would rewrite Resource.cfg");
        }

        // Phase 6: inventory and reports.
        reporter.on_report_start();
        let report_start = Instant::now();
        fs::create_dir_all(&self.config.report_dir)?;
        let inventory_entries = inventory::build_inventory(&files, mods_dir);
        inventory::export_json(
            &inventory_entries,
            &self.config.report_dir.join("ModsInventory.json"),
        )?;
        inventory::export_csv(
            &inventory_entries,
            &self.config.report_dir.join("ModsInventory.csv"),
        )?;

        let conflicts = report::detect_conflicts(&files);
        report::write_conflict_report(
            &conflicts,
            &self.config.report_dir.join("TgiConflicts.csv"),
        )?;
        let broken = report::broken_files(&files);
        report::write_broken_report(&broken, &self.config.report_dir.join("BrokenMods.csv"))?;
        let report_duration = report_start.elapsed();
        reporter.on_report_complete(
            conflicts.len(),
            broken.len(),
            report_duration.as_secs_f64(),
        );

        // Phase 7: version check.
        let outdated_mods = self.check_versions(&files, mode);

        Ok(PipelineResult {
            mode,
            backup_path,
            files_scanned: files.len(),
            garbage_removed: summary.garbage_removed,
            tiny_quarantined: summary.tiny_quarantined,
            duplicates_quarantined: summary.duplicates_quarantined,
            corrupt_quarantined: summary.corrupt_quarantined,
            archives_extracted,
            moved_to_category: summary.moved_to_category,
            conflict_pairs: conflicts.len(),
            broken_files: broken.len(),
            outdated_mods,
            backup_duration,
            scan_duration,
            classify_duration,
            action_duration,
            report_duration,
        })
    }

    /// Extract every archive-status file into its category folder, delete
    /// the archive, and classify the extracted contents. Newly discovered
    /// archives are handled on the next round. Extraction failures demote
    /// the archive to Corrupt so the action pass quarantines it.
    fn run_extraction_rounds(
        &self,
        files: &mut Vec<ModFile>,
        classifier: &mut Classifier,
        mode: RunMode,
    ) -> usize {
        let mods_dir = &self.config.mods_dir;
        let mut extracted = 0usize;
        let mut pending: Vec<usize> = files
            .iter()
            .enumerate()
            .filter(|(_, file)| file.status == FileStatus::Archive)
            .map(|(index, _)| index)
            .collect();

        let mut round = 0;
        while !pending.is_empty() && round < MAX_EXTRACTION_ROUNDS {
            round += 1;
            let mut discovered = Vec::new();

            for index in pending {
                let archive_path = files[index].path.clone();
                let stem = archive_path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "archive".to_string());
                let dest = mods_dir
                    .join(files[index].category.folder_name())
                    .join(stem);

                if !mode.is_apply() {
                    info!(
                        "[dry] would extract {} -> {}",
                        archive_path.display(),
                        dest.display()
                    );
                    extracted += 1;
                    continue;
                }

                match archive::extract(&archive_path, &dest) {
                    Ok(count) => {
                        info!(
                            "Extracted {} ({} files) -> {}",
                            archive_path.display(),
                            count,
                            dest.display()
                        );
                        extracted += 1;
                        if let Err(err) = fs::remove_file(&archive_path) {
                            warn!(
                                "Failed to remove extracted archive {}: {}",
                                archive_path.display(),
                                err
                            );
                        }

                        match scanner::collect_files(
                            &dest,
                            &self.config.ignore_patterns,
                            &self.config.quarantine_dir,
                        ) {
                            Ok(new_entries) => {
                                for entry in &new_entries {
                                    let file = classifier.classify(entry);
                                    if file.status == FileStatus::Archive {
                                        discovered.push(files.len());
                                    }
                                    files.push(file);
                                }
                            }
                            Err(err) => {
                                warn!("Failed to re-scan {}: {}", dest.display(), err)
                            }
                        }
                    }
                    Err(err) => {
                        warn!("Failed to extract {}: {}", archive_path.display(), err);
                        files[index].status = FileStatus::Corrupt;
                    }
                }
            }

            pending = discovered;
        }

        if !pending.is_empty() {
            warn!(
                "{} nested archive(s) left unextracted after {} rounds",
                pending.len(),
                MAX_EXTRACTION_ROUNDS
            );
        }

        extracted
    }

    /// Compare installed mods against the known-versions metadata file, when
    /// configured. In apply mode the metadata file is refreshed first and
    /// stale mods with a download URL are replaced in place. All failures
    /// here are non-fatal.
    fn check_versions(&self, files: &[ModFile], mode: RunMode) -> usize {
        let Some(version_path) = &self.config.known_versions_path else {
            return 0;
        };

        if mode.is_apply() {
            if let Some(url) = &self.config.known_versions_url {
                if let Err(err) = versions::refresh_known_versions(url, version_path) {
                    warn!("Failed to refresh {}: {}", version_path.display(), err);
                }
            }
        }

        if !version_path.exists() {
            return 0;
        }

        let known = match versions::load_known_versions(version_path) {
            Ok(known) => known,
            Err(err) => {
                warn!(
                    "Could not load version file {}: {}",
                    version_path.display(),
                    err
                );
                return 0;
            }
        };

        let outdated = versions::check_versions(files, &known);
        for entry in &outdated {
            info!(
                "Outdated: {} (installed {}, latest {})",
                entry.name, entry.installed, entry.latest
            );
            if mode.is_apply() {
                if let Some(url) = &entry.url {
                    if let Err(err) = versions::download_update(url, &entry.path) {
                        warn!("Failed to download update for {}: {}", entry.name, err);
                    }
                }
            }
        }
        if outdated.is_empty() {
            info!("All known mods are up to date.");
        }

        outdated.len()
    }
}
