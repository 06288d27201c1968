//! Error types for scan operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scanning a directory tree.
///
/// Per-file stat and delete failures during a run are never surfaced
/// through this type; they are tolerated and counted in the outcome.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Scan root does not exist. Callers must distinguish "nothing to
    /// clean" (an empty root) from "cannot clean".
    #[error("Scan root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Scan root exists but is not a directory.
    #[error("Scan root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::RootNotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io_dispatch() {
        let err = ScanError::io(
            "/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ScanError::RootNotFound { .. }));

        let err = ScanError::io(
            "/busy",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::Io { .. }));
    }
}
