//! Error types for the runtime adapter.

use thiserror::Error;

use super::types::BulkReport;

/// Failure of a single runtime operation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The CLI could not be spawned or the daemon is not answering.
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),

    /// The referenced container no longer exists.
    #[error("no such container: {0}")]
    NotFound(String),

    /// The CLI exited non-zero.
    #[error("`{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The CLI did not finish within its time budget.
    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    /// Output did not have the expected shape.
    #[error("unexpected runtime output: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for RuntimeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// A bulk operation where at least one target failed.
///
/// Carries the full report so callers can show which targets succeeded.
#[derive(Debug, Error)]
#[error(
    "{} of {} containers failed to {}",
    .report.failure_count(),
    .report.outcomes.len(),
    .report.operation
)]
pub struct BulkFailure {
    pub report: BulkReport,
}
