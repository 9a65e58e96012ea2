//! The implementation log: append-only markdown, one section per task.
//!
//! ```text
//! ## TASK-001: Set up database
//!
//! **Completed:** 2026-01-13T10:00:00+00:00
//! **Reviewed by:** alice@devbox
//!
//! <summary>
//!
//! ---
//! ```
//!
//! Reviewed IDs are recovered from level-2 `## TASK-NNN:` headings whose next
//! non-blank line is `**Completed:**`. Headings inside a summary are demoted
//! before writing, so an agent's prose can never mark another task reviewed.

use super::ReviewRecord;
use crate::error::{RalphError, Result};
use crate::fs::append_with_header;
use crate::task::TaskId;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const IMPLEMENTATION_LOG_HEADER: &str =
    "# Implementation Log\n\nSummaries of completed tasks, appended by `ralph review`.\n\n";

#[derive(Debug, Clone)]
pub struct ImplementationLog {
    path: PathBuf,
}

impl ImplementationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// IDs that already have a record. A missing log means none.
    pub fn reviewed_ids(&self) -> Result<BTreeSet<TaskId>> {
        if !self.path.exists() {
            return Ok(BTreeSet::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            RalphError::UserError(format!(
                "failed to read implementation log '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(parse_reviewed_ids(&content))
    }

    /// Append records after the existing content.
    pub fn append(&self, records: &[ReviewRecord], reviewer: &str) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let body: String = records.iter().map(|r| format_record(r, reviewer)).collect();
        append_with_header(&self.path, IMPLEMENTATION_LOG_HEADER, &body)
    }
}

/// IDs of the record sections in `content`.
pub fn parse_reviewed_ids(content: &str) -> BTreeSet<TaskId> {
    let mut ids = BTreeSet::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(id) = line.strip_prefix("## ").and_then(TaskId::from_title) else {
            continue;
        };
        while lines.next_if(|next| next.trim().is_empty()).is_some() {}
        if lines
            .peek()
            .is_some_and(|next| next.starts_with("**Completed:**"))
        {
            ids.insert(id);
        }
    }
    ids
}

/// Push every markdown heading in `summary` two levels down, so none of
/// them can read as a record heading.
fn demote_headings(summary: &str) -> String {
    summary
        .lines()
        .map(|line| {
            let body = line.trim_start();
            if body.starts_with('#') {
                let indent = &line[..line.len() - body.len()];
                format!("{}##{}", indent, body)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one record as a markdown section.
pub fn format_record(record: &ReviewRecord, reviewer: &str) -> String {
    format!(
        "## {}: {}\n\n**Completed:** {}\n**Reviewed by:** {}\n\n{}\n\n---\n\n",
        record.task_id,
        record.title,
        record.completed_at.to_rfc3339(),
        reviewer,
        demote_headings(record.summary.trim())
    )
}
