//! Applying a cleanup plan.
//!
//! Order: archive batch, dependency edits, worktree removals, tracker
//! deletions, cleanup log. The archive is written before anything is
//! mutated and a failure to write it aborts the pass. After that, each
//! item fails on its own and the rest of the pass continues.

use super::log::CleanupLog;
use super::{CleanupPlan, Removal};
use crate::error::{RalphError, Result};
use crate::task::{TaskId, TaskStatus};
use crate::tracker::TaskTracker;
use crate::worktree::remove_worktree;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// One item of a pass that could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub item: String,
    pub error: String,
}

/// What an executed pass actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub retired: Vec<TaskId>,
    pub archive_path: Option<PathBuf>,
    /// Edited tasks with the IDs removed from each.
    pub edited: Vec<(TaskId, Vec<TaskId>)>,
    pub removed_worktrees: Vec<(TaskId, PathBuf)>,
    pub deleted: Vec<TaskId>,
    pub failures: Vec<Failure>,
}

impl CleanupOutcome {
    fn fail(&mut self, item: impl Into<String>, error: impl ToString) {
        let item = item.into();
        let error = error.to_string();
        tracing::warn!(item = %item, error = %error, "cleanup step failed");
        self.failures.push(Failure { item, error });
    }
}

/// Where a pass writes.
pub struct CleanupTargets<'a> {
    pub repo_root: &'a Path,
    pub archive_dir: &'a Path,
    pub log: &'a CleanupLog,
    /// `user@host` recorded in the log.
    pub operator: &'a str,
}

/// Apply `plan`. An empty plan does nothing and writes nothing.
pub fn execute(
    plan: &CleanupPlan,
    tracker: &mut dyn TaskTracker,
    targets: &CleanupTargets<'_>,
) -> Result<CleanupOutcome> {
    let mut outcome = CleanupOutcome {
        retired: plan.retired.clone(),
        ..Default::default()
    };
    if plan.is_empty() {
        return Ok(outcome);
    }

    let archive_path = plan.archive_batch.write(targets.archive_dir).map_err(|e| {
        RalphError::UserError(format!(
            "failed to write archive batch, nothing was changed: {}",
            e
        ))
    })?;
    tracing::info!(path = %archive_path.display(), tasks = plan.retired.len(), "archived tasks");
    outcome.archive_path = Some(archive_path);

    for edit in &plan.edits {
        match tracker.update_task(&edit.tracker_id, &edit.update) {
            Ok(()) => {
                tracing::info!(task = %edit.task_id, "removed retired dependencies");
                outcome
                    .edited
                    .push((edit.task_id.clone(), edit.removed.clone()));
            }
            Err(e) => outcome.fail(format!("edit {}", edit.task_id), e),
        }
    }

    for removal in &plan.removals {
        let Removal::Worktree { task_id, path, .. } = removal else {
            continue;
        };
        match remove_worktree(targets.repo_root, path) {
            Ok(()) => {
                tracing::info!(task = %task_id, path = %path.display(), "removed worktree");
                outcome.removed_worktrees.push((task_id.clone(), path.clone()));
            }
            Err(e) => outcome.fail(format!("worktree {}", path.display()), e),
        }
    }

    for removal in &plan.removals {
        let Removal::TrackerTask {
            task_id,
            tracker_id,
        } = removal
        else {
            continue;
        };
        if let Err(e) = delete_if_still_done(tracker, task_id, tracker_id) {
            outcome.fail(format!("delete {}", task_id), e);
            continue;
        }
        tracing::info!(task = %task_id, "deleted tracker task");
        outcome.deleted.push(task_id.clone());
    }

    if let Err(e) = targets.log.append(&outcome, Utc::now(), targets.operator) {
        tracing::warn!(error = %e, "failed to write cleanup log");
        outcome.failures.push(Failure {
            item: format!("log {}", targets.log.path().display()),
            error: e.to_string(),
        });
    }

    Ok(outcome)
}

/// Delete a tracker record after confirming it is still the same done task.
fn delete_if_still_done(
    tracker: &mut dyn TaskTracker,
    task_id: &TaskId,
    tracker_id: &str,
) -> Result<()> {
    let live = tracker.get_task(tracker_id)?;
    if live.ralph_id().as_ref() != Some(task_id) {
        return Err(RalphError::UserError(format!(
            "tracker record '{}' is now titled '{}', refusing to delete",
            tracker_id, live.title
        )));
    }
    if live.status != TaskStatus::Done {
        return Err(RalphError::UserError(format!(
            "{} is now '{}', refusing to delete",
            task_id, live.status
        )));
    }
    tracker.delete_task(tracker_id)
}
