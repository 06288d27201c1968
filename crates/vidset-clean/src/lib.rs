//! Reconciliation and cleanup engine for the vidset dataset pipeline.
//!
//! This crate owns the only destructive step of the pipeline: classifying
//! every file under a scan root against a retention policy, deleting the
//! files that fall outside it, and pruning the directories left empty.
//!
//! The engine is generic over a [`FileSystem`] capability so tests can run
//! against an in-memory tree ([`MemoryFileSystem`]) instead of real disk,
//! and confirmation of the destructive step goes through an injected
//! [`ConfirmationProvider`] rather than any process-global state.

mod confirm;
mod engine;
mod fs;

pub use confirm::{AlwaysConfirm, ConfirmationProvider, InteractiveConfirm, is_affirmative};
pub use engine::{CleanupEngine, RemovalProgress};
pub use fs::{FileEntry, FileSystem, MemoryFileSystem, RealFileSystem};
