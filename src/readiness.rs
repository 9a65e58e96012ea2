//! Which canonical tasks may start now.
//!
//! A task is ready when it is `todo` and each direct dependency is either
//! `done` or unknown to the status map. Unknown dependencies never block, so
//! a reference to a deleted or foreign task cannot deadlock the graph.
//! Chains resolve over successive passes; tasks on a cycle are never ready.

use crate::graph::DependencyGraph;
use crate::snapshot::StatusMap;
use crate::task::{TaskId, TaskStatus};

/// A `todo` task held back by unfinished dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedTask {
    pub id: TaskId,
    /// Dependencies that are known and not `done`.
    pub waiting_on: Vec<TaskId>,
}

/// Outcome of one readiness evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Ready tasks, ascending by numeric suffix.
    pub ready: Vec<TaskId>,
    pub blocked: Vec<BlockedTask>,
    /// Foreign tasks excluded from evaluation.
    pub skipped_not_ralph: usize,
}

/// Evaluate every canonical task in the graph against live statuses.
pub fn evaluate(graph: &DependencyGraph, statuses: &StatusMap) -> Readiness {
    let mut readiness = Readiness {
        skipped_not_ralph: graph.skipped_not_ralph(),
        ..Default::default()
    };

    for id in graph.tasks() {
        if statuses.get(id) != Some(&TaskStatus::Todo) {
            continue;
        }

        let waiting_on: Vec<TaskId> = graph
            .dependencies_of(id)
            .iter()
            .filter(|dep| statuses.get(*dep).is_some_and(|s| *s != TaskStatus::Done))
            .cloned()
            .collect();

        if waiting_on.is_empty() {
            readiness.ready.push(id.clone());
        } else {
            readiness.blocked.push(BlockedTask {
                id: id.clone(),
                waiting_on,
            });
        }
    }

    // Stable: ties keep tracker order.
    readiness.ready.sort_by_key(TaskId::number);
    readiness
}
