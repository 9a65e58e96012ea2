//! The cleanup log: append-only markdown, one section per executed pass.

use super::execution::CleanupOutcome;
use crate::error::Result;
use crate::fs::append_with_header;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const CLEANUP_LOG_HEADER: &str =
    "# Cleanup Log\n\nTasks archived and removed by `ralph cleanup`.\n\n";

#[derive(Debug, Clone)]
pub struct CleanupLog {
    path: PathBuf,
}

impl CleanupLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, outcome: &CleanupOutcome, at: DateTime<Utc>, operator: &str) -> Result<()> {
        append_with_header(&self.path, CLEANUP_LOG_HEADER, &format_entry(outcome, at, operator))
    }
}

/// Render one pass as a markdown section.
pub fn format_entry(outcome: &CleanupOutcome, at: DateTime<Utc>, operator: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Cleanup {}\n", at.to_rfc3339());
    let _ = writeln!(out, "**Run by:** {}", operator);
    let _ = writeln!(out, "**Archived:** {}", join_ids(&outcome.retired));
    if let Some(path) = &outcome.archive_path {
        let _ = writeln!(out, "**Archive file:** {}", path.display());
    }

    if !outcome.edited.is_empty() {
        out.push_str("\n### Dependency edits\n\n");
        for (id, removed) in &outcome.edited {
            let _ = writeln!(out, "- {}: removed {}", id, join_ids(removed));
        }
    }

    if !outcome.removed_worktrees.is_empty() {
        out.push_str("\n### Removed worktrees\n\n");
        for (id, path) in &outcome.removed_worktrees {
            let _ = writeln!(out, "- {} ({})", path.display(), id);
        }
    }

    if !outcome.deleted.is_empty() {
        out.push_str("\n### Deleted tracker tasks\n\n");
        for id in &outcome.deleted {
            let _ = writeln!(out, "- {}", id);
        }
    }

    if !outcome.failures.is_empty() {
        out.push_str("\n### Failures\n\n");
        for failure in &outcome.failures {
            let _ = writeln!(out, "- {}: {}", failure.item, failure.error);
        }
    }

    out.push_str("\n---\n\n");
    out
}

fn join_ids(ids: &[TaskId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
