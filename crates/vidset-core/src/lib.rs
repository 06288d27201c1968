//! Core types for the vidset dataset pipeline.
//!
//! This crate provides the shared data model used throughout the vidset
//! workspace: retention policies, scan classifications, cleanup outcomes,
//! and configuration.

mod config;
mod error;
mod outcome;
mod policy;
mod record;

pub use config::{CleanupConfig, CleanupConfigBuilder};
pub use error::ScanError;
pub use outcome::{CleanupOutcome, RemoveError};
pub use policy::{RetentionPolicy, extension_token};
pub use record::{DEFAULT_PREVIEW_LIMIT, FileRecord, PlanSummary, RemovalPreview, ScanResult};
