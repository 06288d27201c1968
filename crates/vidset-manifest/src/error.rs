//! Error types for manifest loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or persisting a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file does not exist.
    #[error("Manifest file not found: {path}")]
    NotFound { path: PathBuf },

    /// The header row is missing a required column.
    #[error("Manifest is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    /// A data row could not be used.
    #[error("Malformed manifest row at line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    /// The manifest could not be parsed as tab-separated values.
    #[error("Failed to parse manifest: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error with path context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted lookup file could not be read or written as JSON.
    #[error("Invalid link table at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}
