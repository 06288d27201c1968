//! Cleanup configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::policy::RetentionPolicy;
use crate::record::DEFAULT_PREVIEW_LIMIT;

/// Configuration for a cleanup run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CleanupConfig {
    /// Root of the tree to classify and potentially mutate.
    pub root: PathBuf,

    /// Extensions to retain.
    #[builder(default)]
    #[serde(default)]
    pub policy: RetentionPolicy,

    /// Report intended deletions without performing them.
    #[builder(default = "false")]
    #[serde(default)]
    pub dry_run: bool,

    /// Maximum paths shown in a dry-run preview.
    #[builder(default = "DEFAULT_PREVIEW_LIMIT")]
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

fn default_preview_limit() -> usize {
    DEFAULT_PREVIEW_LIMIT
}

impl CleanupConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl CleanupConfig {
    /// Create a new cleanup config builder.
    pub fn builder() -> CleanupConfigBuilder {
        CleanupConfigBuilder::default()
    }

    /// Create a simple config with the default policy.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: RetentionPolicy::default(),
            dry_run: false,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
        }
    }
}
