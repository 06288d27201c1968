//! Cleanup outcome types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An error that occurred while removing a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveError {
    /// The path that failed to be removed.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl RemoveError {
    /// Create a new removal error.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RemoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// The result of an executed (or declined) cleanup run.
///
/// `removed + failed` equals the REMOVE count of the scan result that
/// drove the run; scans are not repeated mid-operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupOutcome {
    /// Files successfully removed.
    pub removed: usize,
    /// Files that could not be removed.
    pub failed: usize,
    /// Directories pruned after deletion.
    pub pruned_dirs: usize,
    /// Directory prune attempts that failed.
    pub prune_failures: usize,
    /// Files still matching the retention policy under the root after
    /// the run, for reporting.
    pub kept_remaining: usize,
    /// Per-file removal errors.
    pub errors: Vec<RemoveError>,
}

impl CleanupOutcome {
    /// The zero-effect outcome returned for empty scans and declined
    /// confirmations.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether every removal and prune attempt succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.prune_failures == 0
    }

    /// A one-line human-readable summary.
    pub fn summary(&self) -> String {
        let mut line = if self.failed == 0 {
            format!("Removed {} file(s)", self.removed)
        } else {
            format!("Removed {} file(s), {} failed", self.removed, self.failed)
        };
        if self.pruned_dirs > 0 || self.prune_failures > 0 {
            line.push_str(&format!(", pruned {} dir(s)", self.pruned_dirs));
        }
        if self.prune_failures > 0 {
            line.push_str(&format!(" ({} prune failure(s))", self.prune_failures));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_outcome() {
        let outcome = CleanupOutcome::zero();
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.pruned_dirs, 0);
        assert!(outcome.errors.is_empty());
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_summary_mentions_failures() {
        let outcome = CleanupOutcome {
            removed: 3,
            failed: 1,
            pruned_dirs: 2,
            ..CleanupOutcome::zero()
        };
        let summary = outcome.summary();
        assert!(summary.contains("3"));
        assert!(summary.contains("1 failed"));
        assert!(summary.contains("2 dir(s)"));
        assert!(!outcome.is_clean());
    }
}
