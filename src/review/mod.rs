//! Completion review.
//!
//! Every canonical task that is `done` and not yet in the implementation log
//! gets one summary record appended to the log. The log doubles as the
//! approval list for cleanup, so a task is never recorded twice and records
//! are only ever appended.

mod log;
mod summary;
#[cfg(test)]
mod tests;

pub use log::ImplementationLog;
pub use summary::{AgentSummarizer, Summarizer};

use crate::error::Result;
use crate::task::{Task, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// One implementation log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub task_id: TaskId,
    /// Title without the `TASK-NNN:` prefix.
    pub title: String,
    pub completed_at: DateTime<Utc>,
    pub summary: String,
}

/// Result of one review pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewReport {
    /// New records, ascending by task ID.
    pub records: Vec<ReviewRecord>,
    /// Done tasks skipped because the log already has them.
    pub already_reviewed: Vec<TaskId>,
    /// Tasks whose summary could not be produced.
    pub failed: Vec<(TaskId, String)>,
    pub skipped_not_ralph: usize,
    /// Tasks handed in that are not actually `done`.
    pub skipped_not_done: usize,
}

/// Select the tasks to review and summarize each of them.
///
/// `summarize` is called once per newly reviewed task; its failure is
/// recorded against that task and the task stays unreviewed.
pub fn review<F>(
    done_tasks: &[&Task],
    already_reviewed: &BTreeSet<TaskId>,
    mut summarize: F,
) -> ReviewReport
where
    F: FnMut(&TaskId, &Task) -> Result<String>,
{
    let mut report = ReviewReport::default();
    let mut candidates: Vec<(TaskId, &Task)> = Vec::new();
    let mut seen: BTreeSet<TaskId> = BTreeSet::new();

    for &task in done_tasks {
        let Some(id) = task.ralph_id() else {
            report.skipped_not_ralph += 1;
            continue;
        };
        if task.status != TaskStatus::Done {
            report.skipped_not_done += 1;
            continue;
        }
        if already_reviewed.contains(&id) {
            report.already_reviewed.push(id);
            continue;
        }
        if !seen.insert(id.clone()) {
            tracing::warn!(task = %id, "task listed twice among done tasks, reviewing once");
            continue;
        }
        candidates.push((id, task));
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));
    report.already_reviewed.sort();

    for (id, task) in candidates {
        match summarize(&id, task) {
            Ok(summary) => {
                tracing::info!(task = %id, "reviewed task");
                report.records.push(ReviewRecord {
                    title: task.short_title().to_string(),
                    completed_at: task.updated_at.unwrap_or_else(Utc::now),
                    summary,
                    task_id: id,
                });
            }
            Err(e) => {
                tracing::warn!(task = %id, error = %e, "failed to summarize task");
                report.failed.push((id, e.to_string()));
            }
        }
    }

    report
}
