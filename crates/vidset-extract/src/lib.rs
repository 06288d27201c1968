//! Tar-family archive expansion for the vidset dataset pipeline.
//!
//! Unpacks downloaded archives into the scan root the cleanup engine
//! later operates on. Supports plain and compressed tarballs, chosen by
//! file-name suffix. Extraction of one archive never aborts the rest of
//! a batch; per-archive failures are collected in the report.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Errors that can occur while expanding a single archive.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file name does not match any supported archive suffix.
    #[error("Unsupported archive name: {path}")]
    Unsupported { path: PathBuf },

    /// The named archive does not exist in the downloads directory.
    #[error("Archive not found: {path}")]
    NotFound { path: PathBuf },

    /// I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Compression wrapped around a tar stream, chosen by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Plain,
    Gzip,
    Xz,
    Bzip2,
}

fn archive_kind(name: &str) -> Option<ArchiveKind> {
    let lowered = name.to_lowercase();
    if lowered.ends_with(".tar") {
        Some(ArchiveKind::Plain)
    } else if lowered.ends_with(".tar.gz") || lowered.ends_with(".tgz") {
        Some(ArchiveKind::Gzip)
    } else if lowered.ends_with(".tar.xz") {
        Some(ArchiveKind::Xz)
    } else if lowered.ends_with(".tar.bz2") {
        Some(ArchiveKind::Bzip2)
    } else {
        None
    }
}

/// Whether a file name looks like a supported archive.
pub fn is_archive_name(name: &str) -> bool {
    archive_kind(name).is_some()
}

/// Progress after each unpacked archive entry.
#[derive(Debug, Clone, Copy)]
pub struct ExtractProgress<'a> {
    /// File name of the archive being expanded.
    pub archive: &'a str,
    /// Entries unpacked so far.
    pub entries_done: usize,
    /// Total entries in the archive.
    pub entries_total: usize,
}

/// Aggregate result of a multi-archive extraction run.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Archive names expanded successfully, in order.
    pub succeeded: Vec<String>,
    /// Archive names that failed, with the per-archive error.
    pub failed: Vec<(String, ExtractError)>,
}

impl ExtractReport {
    /// Total archives attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// An extract stage succeeds unless there were failures and nothing
    /// at all was expanded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() || !self.succeeded.is_empty()
    }
}

/// Supported archives directly inside `dir` (non-recursive), sorted by
/// name. A missing directory yields an empty list.
pub fn find_archives(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut archives = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return archives;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_archive_name(&entry.file_name().to_string_lossy()) {
            archives.push(path);
        }
    }
    archives.sort();
    archives
}

fn open_tar(path: &Path, kind: ArchiveKind) -> Result<tar::Archive<Box<dyn Read>>, ExtractError> {
    let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
    let reader = BufReader::new(file);
    let decoded: Box<dyn Read> = match kind {
        ArchiveKind::Plain => Box::new(reader),
        ArchiveKind::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
        ArchiveKind::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
        ArchiveKind::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
    };
    Ok(tar::Archive::new(decoded))
}

/// Expand one archive into `dest`, creating it if missing.
///
/// Two passes over the archive: the first counts entries so progress
/// has a total, the second unpacks. Entries that would escape the
/// destination are skipped and logged, not fatal. Returns the number of
/// entries unpacked.
pub fn extract_archive(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    mut on_progress: impl FnMut(&ExtractProgress<'_>),
) -> Result<usize, ExtractError> {
    let archive = archive.as_ref();
    let dest = dest.as_ref();
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let kind = archive_kind(&name).ok_or_else(|| ExtractError::Unsupported {
        path: archive.to_path_buf(),
    })?;
    if !archive.is_file() {
        return Err(ExtractError::NotFound {
            path: archive.to_path_buf(),
        });
    }
    std::fs::create_dir_all(dest).map_err(|e| ExtractError::io(dest, e))?;

    let mut counter = open_tar(archive, kind)?;
    let mut entries_total = 0;
    for entry in counter.entries().map_err(|e| ExtractError::io(archive, e))? {
        entry.map_err(|e| ExtractError::io(archive, e))?;
        entries_total += 1;
    }

    let mut unpacker = open_tar(archive, kind)?;
    let mut entries_done = 0;
    for entry in unpacker.entries().map_err(|e| ExtractError::io(archive, e))? {
        let mut entry = entry.map_err(|e| ExtractError::io(archive, e))?;
        match entry.unpack_in(dest) {
            Ok(true) => entries_done += 1,
            Ok(false) => {
                warn!(
                    archive = %name,
                    entry = %entry.path().map(|p| p.display().to_string()).unwrap_or_default(),
                    "skipped entry escaping the destination"
                );
            }
            Err(err) => return Err(ExtractError::io(archive, err)),
        }
        on_progress(&ExtractProgress {
            archive: &name,
            entries_done,
            entries_total,
        });
    }
    Ok(entries_done)
}

/// Expand every supported archive found in `downloads` into `dest`.
pub fn extract_all(
    downloads: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    mut on_progress: impl FnMut(&ExtractProgress<'_>),
) -> ExtractReport {
    let archives = find_archives(&downloads);
    let mut report = ExtractReport::default();
    for archive in archives {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match extract_archive(&archive, &dest, &mut on_progress) {
            Ok(_) => report.succeeded.push(name),
            Err(err) => {
                warn!(archive = %name, error = %err, "extraction failed");
                report.failed.push((name, err));
            }
        }
    }
    report
}

/// Expand specific archives by file name out of `downloads` into `dest`.
///
/// A missing or unsupported name is a per-archive failure; the rest of
/// the batch still runs.
pub fn extract_named(
    names: &[String],
    downloads: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    mut on_progress: impl FnMut(&ExtractProgress<'_>),
) -> ExtractReport {
    let downloads = downloads.as_ref();
    let mut report = ExtractReport::default();
    for name in names {
        let archive = downloads.join(name);
        match extract_archive(&archive, &dest, &mut on_progress) {
            Ok(_) => report.succeeded.push(name.clone()),
            Err(err) => {
                warn!(archive = %name, error = %err, "extraction failed");
                report.failed.push((name.clone(), err));
            }
        }
    }
    report
}
