//! Manifest loading for the vidset dataset pipeline.
//!
//! Parses the tab-separated manifest of dataset file names and CDN links
//! into a [`LinkTable`], and persists that table as the JSON lookup file
//! the download stage consumes.

mod error;
mod table;

pub use error::ManifestError;
pub use table::{LinkTable, load_manifest};
