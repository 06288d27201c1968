//! Blocking archive downloader for the vidset dataset pipeline.
//!
//! One blocking GET per file, streamed to the downloads directory in
//! fixed-size chunks with a progress callback after each chunk. No
//! retries and no parallelism; failed downloads are collected per name
//! and never abort the batch.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use vidset_manifest::LinkTable;

const CHUNK_SIZE: usize = 8192;

/// Errors that can occur while downloading a single file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The requested name is not in the link table.
    #[error("File '{name}' not found in dataset")]
    UnknownFile { name: String },

    /// The server answered with a non-success status.
    #[error("Failed to download '{name}': HTTP {code}")]
    HttpStatus { name: String, code: u16 },

    /// Transport-level failure (DNS, connect, TLS, read).
    #[error("Transport error: {0}")]
    Transport(#[from] Box<ureq::Error>),

    /// I/O error writing the downloaded file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress after each received chunk of a download.
#[derive(Debug, Clone, Copy)]
pub struct DownloadProgress<'a> {
    /// Name of the file being downloaded.
    pub name: &'a str,
    /// Bytes received so far.
    pub received: u64,
    /// Total size from `Content-Length`, when the server sent one.
    pub total: Option<u64>,
}

/// Aggregate result of a multi-file download run.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Names downloaded successfully, in request order.
    pub succeeded: Vec<String>,
    /// Names that failed, with the per-name error.
    pub failed: Vec<(String, FetchError)>,
}

impl FetchReport {
    /// Total names attempted.
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// A download stage succeeds unless there were failures and nothing
    /// at all came through.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() || !self.succeeded.is_empty()
    }
}

/// Downloads manifest entries into an output directory.
pub struct Downloader {
    agent: ureq::Agent,
    output_dir: PathBuf,
}

impl Downloader {
    /// Create a downloader writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(30))
            .build();
        Self {
            agent,
            output_dir: output_dir.into(),
        }
    }

    /// The directory downloads are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download one URL to `output_dir/name`, streaming in 8 KiB chunks.
    pub fn download(
        &self,
        name: &str,
        url: &str,
        mut on_progress: impl FnMut(&DownloadProgress<'_>),
    ) -> Result<PathBuf, FetchError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| FetchError::Io {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => {
                return Err(FetchError::HttpStatus {
                    name: name.to_string(),
                    code,
                });
            }
            Err(err) => return Err(FetchError::Transport(Box::new(err))),
        };

        let total = response
            .header("Content-Length")
            .and_then(|value| value.parse::<u64>().ok());

        let output_path = self.output_dir.join(name);
        let mut file = std::fs::File::create(&output_path).map_err(|e| FetchError::Io {
            path: output_path.clone(),
            source: e,
        })?;

        let mut reader = response.into_reader();
        let mut buffer = [0u8; CHUNK_SIZE];
        let mut received = 0u64;
        loop {
            let read = reader.read(&mut buffer).map_err(|e| FetchError::Io {
                path: output_path.clone(),
                source: e,
            })?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read]).map_err(|e| FetchError::Io {
                path: output_path.clone(),
                source: e,
            })?;
            received += read as u64;
            on_progress(&DownloadProgress {
                name,
                received,
                total,
            });
        }
        Ok(output_path)
    }

    /// Download every name in `names` sequentially, collecting per-name
    /// results. A name absent from the table is a per-name failure; one
    /// failed download never aborts the rest.
    pub fn download_all(
        &self,
        table: &LinkTable,
        names: &[String],
        mut on_progress: impl FnMut(&DownloadProgress<'_>),
    ) -> FetchReport {
        let mut report = FetchReport::default();
        for name in names {
            let result = match table.get(name) {
                Some(url) => self.download(name, url, &mut on_progress).map(|_| ()),
                None => Err(FetchError::UnknownFile { name: name.clone() }),
            };
            match result {
                Ok(()) => report.succeeded.push(name.clone()),
                Err(err) => {
                    warn!(name = %name, error = %err, "download failed");
                    report.failed.push((name.clone(), err));
                }
            }
        }
        report
    }
}
