/// Trait for reporting pipeline progress.
///
/// The CLI implements this with indicatif spinners and bars. All methods
/// have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_backup_start(&self) {}
    fn on_backup_complete(&self, _files_archived: usize, _duration_secs: f64) {}
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_classify_start(&self, _total_files: usize) {}
    fn on_classify_progress(&self, _files_classified: usize, _total_files: usize) {}
    fn on_classify_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_action_start(&self) {}
    fn on_action_complete(&self, _actions_taken: usize, _duration_secs: f64) {}
    fn on_report_start(&self) {}
    fn on_report_complete(&self, _conflicts: usize, _broken: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
