//! Retiring reviewed tasks.
//!
//! A task is retired when it is recorded in the implementation log AND is
//! currently `done`. Planning is pure: [`plan_cleanup`] computes the archive
//! batch, the dependency edits on the remaining tasks and the resources to
//! remove. [`execute`] applies a plan. Only IDs exactly in the retired set
//! are stripped, and foreign tasks are never edited.

mod archive;
mod execution;
mod log;
mod rewrite;

pub use archive::ArchiveBatch;
pub use execution::{CleanupOutcome, CleanupTargets, execute};
pub use log::CleanupLog;
pub use rewrite::strip_ids;

use crate::graph::{DependencyGraph, DependencySource};
use crate::snapshot::Snapshot;
use crate::task::{TaskId, TaskStatus, TaskUpdate};
use crate::worktree::{Worktree, worktrees_for};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A change to one remaining task's dependencies.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyEdit {
    pub task_id: TaskId,
    pub tracker_id: String,
    /// Retired IDs taken out of this task's dependencies.
    pub removed: Vec<TaskId>,
    /// What gets sent to the tracker.
    pub update: TaskUpdate,
}

/// An external resource to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Worktree {
        task_id: TaskId,
        path: PathBuf,
        branch: Option<String>,
    },
    TrackerTask {
        task_id: TaskId,
        tracker_id: String,
    },
}

/// Everything one cleanup pass would do.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupPlan {
    /// Reviewed and done, ascending.
    pub retired: Vec<TaskId>,
    pub archive_batch: ArchiveBatch,
    pub edits: Vec<DependencyEdit>,
    /// Worktrees first, then tracker records.
    pub removals: Vec<Removal>,
    /// Reviewed but not currently `done`; left alone.
    pub skipped_not_done: Vec<TaskId>,
    /// Foreign tasks seen and left alone.
    pub skipped_foreign: usize,
}

impl CleanupPlan {
    pub fn is_empty(&self) -> bool {
        self.retired.is_empty()
    }
}

/// What to plan against.
pub struct CleanupInput<'a> {
    pub reviewed_ids: &'a BTreeSet<TaskId>,
    pub snapshot: &'a Snapshot,
    pub worktrees: &'a [Worktree],
    pub source: DependencySource,
    pub project: Option<String>,
    /// Archive timestamp.
    pub now: DateTime<Utc>,
}

/// Plan one cleanup pass.
pub fn plan_cleanup(input: CleanupInput<'_>) -> CleanupPlan {
    let mut retired: BTreeSet<TaskId> = BTreeSet::new();
    let mut retired_tasks = Vec::new();
    let mut skipped_not_done = Vec::new();

    for (id, task) in input.snapshot.ralph_tasks() {
        if !input.reviewed_ids.contains(&id) {
            continue;
        }
        if task.status == TaskStatus::Done {
            retired.insert(id);
            retired_tasks.push(task);
        } else {
            tracing::warn!(task = %id, status = %task.status, "reviewed task is not done, skipping");
            skipped_not_done.push(id);
        }
    }
    skipped_not_done.sort();
    retired_tasks.sort_by_key(|t| t.ralph_id());

    let graph = DependencyGraph::build(input.snapshot.tasks(), input.source);
    let candidates: BTreeSet<&TaskId> = retired
        .iter()
        .flat_map(|r| graph.dependents_of(r))
        .filter(|dependent| !retired.contains(*dependent))
        .collect();

    let mut edits = Vec::new();
    for id in candidates {
        let Some(task) = input.snapshot.get(id) else {
            continue;
        };
        let removed: Vec<TaskId> = graph
            .dependencies_of(id)
            .intersection(&retired)
            .cloned()
            .collect();

        let update = match (input.source, &task.dependencies) {
            (DependencySource::Structured, Some(deps)) => TaskUpdate {
                dependencies: Some(
                    deps.iter()
                        .filter(|dep| !retired.iter().any(|r| r.as_str() == dep.trim()))
                        .cloned()
                        .collect(),
                ),
                ..Default::default()
            },
            _ => TaskUpdate::description(strip_ids(&task.description, &retired)),
        };

        edits.push(DependencyEdit {
            task_id: id.clone(),
            tracker_id: task.tracker_id.clone(),
            removed,
            update,
        });
    }

    let mut removals: Vec<Removal> = worktrees_for(input.worktrees, &retired)
        .into_iter()
        .map(|(task_id, wt)| Removal::Worktree {
            task_id,
            path: wt.path,
            branch: wt.branch,
        })
        .collect();
    removals.extend(retired_tasks.iter().filter_map(|task| {
        Some(Removal::TrackerTask {
            task_id: task.ralph_id()?,
            tracker_id: task.tracker_id.clone(),
        })
    }));

    CleanupPlan {
        retired: retired.into_iter().collect(),
        archive_batch: ArchiveBatch {
            archived_at: input.now,
            project: input.project,
            tasks: retired_tasks.into_iter().cloned().collect(),
        },
        edits,
        removals,
        skipped_not_done,
        skipped_foreign: input.snapshot.foreign_count(),
    }
}
