//! The name -> URL link table and its TSV/JSON formats.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

const FILE_NAME_COLUMN: &str = "file_name";
const CDN_LINK_COLUMN: &str = "cdn_link";

/// An insertion-ordered mapping of dataset file names to download URLs.
///
/// Persisted as a plain JSON object (`dataset_links.json`), the only
/// side state the pipeline stages share.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkTable {
    entries: IndexMap<String, String>,
}

impl LinkTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A duplicate name replaces the previous URL while
    /// keeping the original position.
    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.entries.insert(name.into(), url.into());
    }

    /// Look up the URL for a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// All names in manifest order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over (name, url) pairs in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the table as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| ManifestError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ManifestError::io(path, e))
    }

    /// Read a table previously written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ManifestError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| ManifestError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Parse a tab-separated manifest into a [`LinkTable`].
///
/// The header row must contain `file_name` and `cdn_link` columns, in
/// any order; extra columns are ignored. A row with a blank file name
/// is malformed. Duplicate names keep the last URL seen.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<LinkTable, ManifestError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ManifestError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let name_index = column_index(&headers, FILE_NAME_COLUMN)?;
    let link_index = column_index(&headers, CDN_LINK_COLUMN)?;

    let mut table = LinkTable::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let name = field(&record, name_index, FILE_NAME_COLUMN, line)?;
        let url = field(&record, link_index, CDN_LINK_COLUMN, line)?;
        if name.trim().is_empty() {
            return Err(ManifestError::MalformedRow {
                line,
                message: "blank file_name".to_string(),
            });
        }
        table.insert(name.trim(), url.trim());
    }
    Ok(table)
}

fn column_index(
    headers: &csv::StringRecord,
    column: &'static str,
) -> Result<usize, ManifestError> {
    headers
        .iter()
        .position(|header| header.trim() == column)
        .ok_or(ManifestError::MissingColumn { column })
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
) -> Result<&'r str, ManifestError> {
    record.get(index).ok_or_else(|| ManifestError::MalformedRow {
        line,
        message: format!("missing '{column}' field"),
    })
}
