//! Scan classification data model.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Default number of paths shown in a dry-run preview.
pub const DEFAULT_PREVIEW_LIMIT: usize = 20;

/// A regular file discovered under the scan root.
///
/// Materialized transiently by a scan; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path of the file.
    pub path: PathBuf,
    /// Size in bytes. A file that vanished between discovery and stat
    /// contributes zero.
    pub size: u64,
    /// Lowercased extension token including the leading dot; empty for
    /// files with no extension.
    pub extension: CompactString,
}

impl FileRecord {
    /// Create a new file record.
    pub fn new(path: impl Into<PathBuf>, size: u64, extension: impl Into<CompactString>) -> Self {
        Self {
            path: path.into(),
            size,
            extension: extension.into(),
        }
    }
}

/// The result of classifying a directory tree against a retention policy.
///
/// The two sequences partition exactly the set of regular files present
/// under the root at scan time; no path appears in both. Ordering is
/// traversal-encounter order, stable for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    /// Files whose extension matched the policy.
    pub to_keep: Vec<FileRecord>,
    /// Files slated for removal.
    pub to_remove: Vec<FileRecord>,
}

impl ScanResult {
    /// Number of files classified as KEEP.
    pub fn keep_count(&self) -> usize {
        self.to_keep.len()
    }

    /// Number of files classified as REMOVE.
    pub fn remove_count(&self) -> usize {
        self.to_remove.len()
    }

    /// Total bytes across all REMOVE entries.
    pub fn total_remove_bytes(&self) -> u64 {
        self.to_remove.iter().map(|record| record.size).sum()
    }

    /// Aggregate counts for reporting. Pure.
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            keep_count: self.keep_count(),
            remove_count: self.remove_count(),
            total_remove_bytes: self.total_remove_bytes(),
        }
    }

    /// The first `limit` REMOVE paths in scan order, plus a count of how
    /// many remain unshown. Pure, side-effect free.
    pub fn preview(&self, limit: usize) -> RemovalPreview {
        RemovalPreview {
            paths: self
                .to_remove
                .iter()
                .take(limit)
                .map(|record| record.path.clone())
                .collect(),
            remaining: self.to_remove.len().saturating_sub(limit),
        }
    }
}

/// Human-readable counts derived from a [`ScanResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Files that will be kept.
    pub keep_count: usize,
    /// Files that will be removed.
    pub remove_count: usize,
    /// Total size of the files that will be removed.
    pub total_remove_bytes: u64,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s) to keep, {} file(s) to remove ({})",
            self.keep_count,
            self.remove_count,
            humansize::format_size(self.total_remove_bytes, humansize::BINARY)
        )
    }
}

/// A bounded listing of the paths a destructive run would remove.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalPreview {
    /// The first paths in scan order, up to the requested limit.
    pub paths: Vec<PathBuf>,
    /// How many REMOVE entries were not shown.
    pub remaining: usize,
}

impl RemovalPreview {
    /// Iterate over the previewed paths.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}
