//! One pass's view of the tracker.
//!
//! A snapshot is fetched once at the start of a pass and handed to every
//! phase, so readiness, scheduling and cleanup decisions within a pass agree
//! with each other. It is never reused across passes.

use crate::error::Result;
use crate::task::{Task, TaskId, TaskStatus};
use crate::tracker::TaskTracker;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Canonical ID to live status.
pub type StatusMap = HashMap<TaskId, TaskStatus>;

#[derive(Debug, Clone)]
pub struct Snapshot {
    tasks: Vec<Task>,
    /// Canonical ID to position in `tasks` (first occurrence).
    index: HashMap<TaskId, usize>,
    fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(tasks: Vec<Task>) -> Self {
        let mut index = HashMap::new();
        for (pos, task) in tasks.iter().enumerate() {
            let Some(id) = task.ralph_id() else { continue };
            if let Some(&first) = index.get(&id) {
                let first: &Task = &tasks[first];
                tracing::warn!(
                    task = %id,
                    kept = %first.tracker_id,
                    ignored = %task.tracker_id,
                    "duplicate task ID in tracker, keeping the first"
                );
                continue;
            }
            index.insert(id, pos);
        }

        Self {
            tasks,
            index,
            fetched_at: Utc::now(),
        }
    }

    /// List every task of the project. Tracker failure aborts the pass.
    pub fn fetch(tracker: &mut dyn TaskTracker) -> Result<Self> {
        let tasks = tracker.list_tasks(None)?;
        tracing::debug!(tasks = tasks.len(), "fetched tracker snapshot");
        Ok(Self::new(tasks))
    }

    /// Every task, foreign ones included, in tracker order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.index.get(id).map(|&pos| &self.tasks[pos])
    }

    /// Status of every canonical task.
    pub fn statuses(&self) -> StatusMap {
        self.index
            .iter()
            .map(|(id, &pos)| (id.clone(), self.tasks[pos].status))
            .collect()
    }

    /// Canonical tasks with their IDs, in tracker order. Duplicates are
    /// left out.
    pub fn ralph_tasks(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter().enumerate().filter_map(|(pos, task)| {
            let id = task.ralph_id()?;
            (self.index.get(&id) == Some(&pos)).then_some((id, task))
        })
    }

    /// Canonical tasks currently in `status`.
    pub fn with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.ralph_tasks()
            .filter(|(_, t)| t.status == status)
            .map(|(_, t)| t)
            .collect()
    }

    /// Tasks without a canonical ID.
    pub fn foreign_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_ralph_task()).count()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}
