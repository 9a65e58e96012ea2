//! The external task tracker: the single source of truth for task state.
//!
//! Every pass reads live state through [`TaskTracker`] and writes changes
//! back through it; nothing about task status is cached locally between
//! passes. [`McpTracker`] talks to vibe-kanban's MCP server over stdio.

mod mcp;
#[cfg(test)]
pub(crate) mod memory;
pub mod protocol;

pub use mcp::McpTracker;

use crate::config::RepoConfig;
use crate::error::Result;
use crate::task::{Task, TaskStatus, TaskUpdate};

/// What to start a workspace session with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRequest {
    /// Executor profile, e.g. `CLAUDE_CODE`.
    pub executor: String,
    pub variant: Option<String>,
    /// Repository and branch, with the base branch already resolved.
    pub repo: RepoConfig,
}

/// Operations the tracker offers. Methods take `&mut self` because a
/// protocol client owns a live connection.
pub trait TaskTracker {
    /// All tasks of the project, optionally filtered by status.
    fn list_tasks(&mut self, status: Option<TaskStatus>) -> Result<Vec<Task>>;

    /// One task by its tracker identifier.
    fn get_task(&mut self, tracker_id: &str) -> Result<Task>;

    fn update_task(&mut self, tracker_id: &str, update: &TaskUpdate) -> Result<()>;

    fn delete_task(&mut self, tracker_id: &str) -> Result<()>;

    /// Start a coding-agent workspace for the task. Returns the session ID.
    fn start_workspace_session(
        &mut self,
        tracker_id: &str,
        request: &WorkspaceRequest,
    ) -> Result<String>;
}
