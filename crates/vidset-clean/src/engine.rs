//! The reconciliation and cleanup engine.

use std::path::Path;

use tracing::warn;

use vidset_core::{
    CleanupConfig, CleanupOutcome, FileRecord, RemoveError, ScanError, ScanResult,
    extension_token,
};

use crate::fs::FileSystem;

/// Progress emitted after each removal attempt.
#[derive(Debug, Clone, Copy)]
pub struct RemovalProgress<'a> {
    /// Removal attempts completed so far, successful or not.
    pub completed: usize,
    /// Total REMOVE entries in the run.
    pub total: usize,
    /// The path just attempted.
    pub current: &'a Path,
}

/// Classifies a directory tree against a retention policy and deletes
/// everything outside it.
///
/// The engine never repeats a scan mid-operation: `execute` works from
/// the [`ScanResult`] snapshot it is given, so the outcome counts are
/// consistent with that snapshot. It is not safe to run two engines
/// concurrently over the same root.
pub struct CleanupEngine<F: FileSystem> {
    fs: F,
    config: CleanupConfig,
}

impl<F: FileSystem> CleanupEngine<F> {
    /// Create an engine over the given filesystem capability.
    pub fn new(fs: F, config: CleanupConfig) -> Self {
        Self { fs, config }
    }

    /// The configuration this engine runs with.
    pub fn config(&self) -> &CleanupConfig {
        &self.config
    }

    /// Consume the engine, handing back the filesystem capability.
    pub fn into_fs(self) -> F {
        self.fs
    }

    /// Classify every file under the root as keep-or-remove.
    ///
    /// A missing root is an explicit error; an empty root is a normal,
    /// empty result. A file whose stat failed mid-walk is still
    /// classified, contributing size zero.
    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        let root = &self.config.root;
        if !self.fs.dir_exists(root) {
            return Err(ScanError::RootNotFound { path: root.clone() });
        }

        let entries = self
            .fs
            .walk_files(root)
            .map_err(|e| ScanError::io(root.clone(), e))?;

        let mut result = ScanResult::default();
        for entry in entries {
            let extension = extension_token(&entry.path);
            let size = entry.size.unwrap_or(0);
            let record = FileRecord::new(entry.path, size, extension);
            if self.config.policy.contains(&record.extension) {
                result.to_keep.push(record);
            } else {
                result.to_remove.push(record);
            }
        }
        Ok(result)
    }

    /// Delete every REMOVE entry of `scan`, then prune emptied
    /// directories.
    ///
    /// An empty `to_remove` short-circuits to a zero outcome without
    /// consulting `confirmed`. A declined confirmation (`confirmed ==
    /// false`) also yields a zero outcome; it is a normal control path,
    /// not an error. Per-file failures are logged, counted, and never
    /// abort the batch.
    pub fn execute(&self, scan: &ScanResult, confirmed: bool) -> CleanupOutcome {
        self.execute_with_progress(scan, confirmed, |_| {})
    }

    /// [`execute`](Self::execute) with a callback invoked after each
    /// removal attempt.
    pub fn execute_with_progress(
        &self,
        scan: &ScanResult,
        confirmed: bool,
        mut on_progress: impl FnMut(RemovalProgress<'_>),
    ) -> CleanupOutcome {
        if scan.to_remove.is_empty() {
            return CleanupOutcome::zero();
        }
        if !confirmed {
            return CleanupOutcome::zero();
        }

        let mut outcome = CleanupOutcome::zero();
        let total = scan.to_remove.len();
        for (index, record) in scan.to_remove.iter().enumerate() {
            match self.fs.remove_file(&record.path) {
                Ok(()) => outcome.removed += 1,
                Err(err) => {
                    warn!(path = %record.path.display(), error = %err, "failed to remove file");
                    outcome.failed += 1;
                    outcome
                        .errors
                        .push(RemoveError::new(record.path.clone(), err.to_string()));
                }
            }
            on_progress(RemovalProgress {
                completed: index + 1,
                total,
                current: &record.path,
            });
        }

        let (pruned, prune_failures) = self.prune_empty_dirs();
        outcome.pruned_dirs = pruned;
        outcome.prune_failures = prune_failures;
        outcome.kept_remaining = self.count_kept_remaining();
        outcome
    }

    /// Remove directories left with no files and no subdirectories,
    /// bottom-up, so an emptied child makes its parent eligible in the
    /// same pass. The scan root itself is never removed.
    fn prune_empty_dirs(&self) -> (usize, usize) {
        let mut pruned = 0;
        let mut failures = 0;
        self.prune_dir(&self.config.root, true, &mut pruned, &mut failures);
        (pruned, failures)
    }

    fn prune_dir(&self, dir: &Path, is_root: bool, pruned: &mut usize, failures: &mut usize) {
        let subdirs = match self.fs.subdirectories(dir) {
            Ok(subdirs) => subdirs,
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "failed to list directory during prune");
                *failures += 1;
                return;
            }
        };
        for subdir in &subdirs {
            self.prune_dir(subdir, false, pruned, failures);
        }
        if is_root {
            return;
        }
        match self.fs.dir_is_empty(dir) {
            Ok(true) => match self.fs.remove_dir(dir) {
                Ok(()) => *pruned += 1,
                Err(err) => {
                    warn!(path = %dir.display(), error = %err, "failed to prune directory");
                    *failures += 1;
                }
            },
            Ok(false) => {}
            Err(err) => {
                warn!(path = %dir.display(), error = %err, "failed to inspect directory during prune");
                *failures += 1;
            }
        }
    }

    /// Post-hoc count of files still matching the policy under the
    /// root, as a sanity figure for the outcome report.
    fn count_kept_remaining(&self) -> usize {
        match self.fs.walk_files(&self.config.root) {
            Ok(entries) => entries
                .iter()
                .filter(|entry| self.config.policy.contains(&extension_token(&entry.path)))
                .count(),
            Err(err) => {
                warn!(error = %err, "failed to re-count kept files after cleanup");
                0
            }
        }
    }
}
