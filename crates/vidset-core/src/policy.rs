//! Retention policy: the set of file extensions a cleanup run preserves.

use std::collections::BTreeSet;
use std::path::Path;

use compact_str::{CompactString, ToCompactString, format_compact};
use serde::{Deserialize, Serialize};

/// A set of case-insensitive file extensions to retain during cleanup.
///
/// Tokens are stored normalized: lowercased, with a leading dot prepended
/// to any non-empty token that lacks one. The empty token `""` is legal
/// and matches files that have no extension at all.
///
/// The default policy keeps `.mp4` files. An explicitly empty policy
/// means "keep nothing" and is handled like any other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    extensions: BTreeSet<CompactString>,
}

impl RetentionPolicy {
    /// Create a policy from extension tokens, normalizing each one.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_token(ext.as_ref()))
                .collect(),
        }
    }

    /// A policy that keeps nothing.
    pub fn empty() -> Self {
        Self {
            extensions: BTreeSet::new(),
        }
    }

    /// Whether the given extension token is retained.
    ///
    /// The token is normalized before lookup, so callers may pass any
    /// casing, with or without the leading dot.
    pub fn contains(&self, token: &str) -> bool {
        self.extensions.contains(&normalize_token(token))
    }

    /// Number of extension tokens in the policy.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Whether the policy retains nothing.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Iterate over the normalized tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(|ext| ext.as_str())
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new([".mp4"])
    }
}

impl std::fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for ext in &self.extensions {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            if ext.is_empty() {
                write!(f, "(no extension)")?;
            } else {
                write!(f, "{ext}")?;
            }
        }
        Ok(())
    }
}

/// Extract the lowercased extension token of a path, including the
/// leading dot. Files with no extension yield the empty token.
pub fn extension_token(path: &Path) -> CompactString {
    match path.extension() {
        Some(ext) => format_compact!(".{}", ext.to_string_lossy().to_lowercase()),
        None => CompactString::default(),
    }
}

fn normalize_token(token: &str) -> CompactString {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return CompactString::default();
    }
    let lowered = trimmed.to_lowercase();
    if lowered.starts_with('.') {
        lowered.to_compact_string()
    } else {
        format_compact!(".{lowered}")
    }
}
