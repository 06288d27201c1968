//! Confirmation of the destructive step.

use std::io::{BufRead, Write};

/// Abstraction over the "may I delete these files?" question.
///
/// The orchestrator selects an implementation; the engine itself only
/// ever receives the resolved boolean.
pub trait ConfirmationProvider {
    /// Ask for confirmation. `true` means proceed.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Whether a typed response counts as "yes".
///
/// Affirmative responses are exactly `y` and `yes`, trimmed and
/// case-insensitive. Empty input declines; the prompt renders `[y/N]`
/// so the displayed default matches the behavior.
pub fn is_affirmative(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompts on stderr and reads one line from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractiveConfirm;

impl InteractiveConfirm {
    /// Create a new interactive provider.
    pub fn new() -> Self {
        Self
    }
}

impl ConfirmationProvider for InteractiveConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        let mut stderr = std::io::stderr();
        if write!(stderr, "{prompt} [y/N] ").and_then(|_| stderr.flush()).is_err() {
            return false;
        }
        let mut response = String::new();
        match std::io::stdin().lock().read_line(&mut response) {
            Ok(_) => is_affirmative(&response),
            Err(_) => false,
        }
    }
}

/// Always answers yes. For scripted and unattended pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl AlwaysConfirm {
    /// Create a new auto-confirming provider.
    pub fn new() -> Self {
        Self
    }
}

impl ConfirmationProvider for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}
