// file: src/sync/outcome.rs
// description: per-repository terminal outcomes and status-line rendering
// reference: human-readable reporting with colored glyphs

use crate::utils::logging::{format_error, format_success, format_warning};

/// Terminal result of one repository task. Produced once per repository,
/// consumed only for reporting, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Cloned,
    Updated,
    /// The local `origin` URL differs from the expected one. The directory
    /// is left untouched; this always requires manual intervention.
    RemoteMismatch {
        expected: String,
        actual: String,
    },
    CloneFailed(String),
    UpdateFailed(String),
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Cloned | Self::Updated)
    }

    /// Render the status block for one repository. Multi-line for a
    /// mismatch; always emitted as a single atomic print by the caller.
    pub fn render(&self, repo_name: &str) -> String {
        match self {
            Self::Cloned => format_success(&format!("{} cloned successfully", repo_name)),
            Self::Updated => format_success(&format!("{} updated successfully", repo_name)),
            Self::RemoteMismatch { expected, actual } => format!(
                "{}\n  {}\n  {}",
                format_error(&format!("Remote mismatch for {}", repo_name)),
                format_warning(&format!("expected {}, found {}", expected, actual)),
                format_warning("please check the repository manually"),
            ),
            Self::CloneFailed(reason) => {
                format_error(&format!("Failed to clone {}: {}", repo_name, reason))
            }
            Self::UpdateFailed(reason) => {
                format_error(&format!("Failed to update {}: {}", repo_name, reason))
            }
        }
    }
}
