//! Error types for the ralph CLI.
//!
//! Uses thiserror for derive macros. Only failures that invalidate a whole
//! pass are errors; per-task problems are collected in phase reports.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for ralph operations.
#[derive(Error, Debug)]
pub enum RalphError {
    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The task tracker is unreachable or returned an unusable response.
    #[error("Task tracker unavailable: {0}")]
    TrackerError(String),

    /// Git operation failed.
    #[error("Git operation failed: {0}")]
    GitError(String),

    /// The coding-agent CLI failed.
    #[error("Agent invocation failed: {0}")]
    AgentError(String),
}

impl RalphError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RalphError::UserError(_) => exit_codes::USER_ERROR,
            RalphError::TrackerError(_) => exit_codes::TRACKER_FAILURE,
            RalphError::GitError(_) => exit_codes::GIT_FAILURE,
            RalphError::AgentError(_) => exit_codes::AGENT_FAILURE,
        }
    }
}

/// Result type alias for ralph operations.
pub type Result<T> = std::result::Result<T, RalphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = RalphError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn tracker_error_has_correct_exit_code() {
        let err = RalphError::TrackerError("connection refused".to_string());
        assert_eq!(err.exit_code(), exit_codes::TRACKER_FAILURE);
    }

    #[test]
    fn git_error_has_correct_exit_code() {
        let err = RalphError::GitError("worktree remove failed".to_string());
        assert_eq!(err.exit_code(), exit_codes::GIT_FAILURE);
    }

    #[test]
    fn agent_error_has_correct_exit_code() {
        let err = RalphError::AgentError("copilot not found".to_string());
        assert_eq!(err.exit_code(), exit_codes::AGENT_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = RalphError::TrackerError("timed out".to_string());
        assert_eq!(err.to_string(), "Task tracker unavailable: timed out");

        let err = RalphError::UserError("no project_name configured".to_string());
        assert_eq!(err.to_string(), "no project_name configured");
    }
}
