//! Dependency graph over canonical tasks.
//!
//! Nodes are Ralph tasks; an edge `A -> B` means A depends on B. Foreign
//! tasks are never nodes, though a canonical task may still name a
//! dependency that is absent from the graph. The graph keeps both the
//! forward (`depends_on`) and reverse (`dependents`) adjacency so cleanup can
//! find the tasks that mention a retired ID without rescanning.

mod cycles;
mod extract;

pub use cycles::find_cycles;
pub use extract::DependencySource;

use crate::task::{Task, TaskId};
use std::collections::{BTreeMap, BTreeSet};

static EMPTY: BTreeSet<TaskId> = BTreeSet::new();

/// Directed dependency graph built from one task snapshot.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Canonical IDs in the order the tracker listed them.
    order: Vec<TaskId>,
    depends_on: BTreeMap<TaskId, BTreeSet<TaskId>>,
    dependents: BTreeMap<TaskId, BTreeSet<TaskId>>,
    skipped_not_ralph: usize,
}

impl DependencyGraph {
    /// Build the graph from a task list.
    ///
    /// Foreign tasks are counted and skipped. When two tasks share a
    /// canonical ID the first one listed wins. Self-dependencies are dropped.
    pub fn build(tasks: &[Task], source: DependencySource) -> Self {
        let mut graph = Self::default();

        for task in tasks {
            let Some(id) = task.ralph_id() else {
                graph.skipped_not_ralph += 1;
                continue;
            };
            if graph.depends_on.contains_key(&id) {
                tracing::debug!(task = %id, "duplicate task ID in graph input, keeping first");
                continue;
            }

            let mut deps = source.extract(task);
            if deps.remove(&id) {
                tracing::warn!(task = %id, "task lists itself as a dependency, ignoring");
            }

            for dep in &deps {
                graph
                    .dependents
                    .entry(dep.clone())
                    .or_default()
                    .insert(id.clone());
            }
            graph.order.push(id.clone());
            graph.depends_on.insert(id, deps);
        }

        graph
    }

    /// Canonical task IDs in tracker order.
    pub fn tasks(&self) -> &[TaskId] {
        &self.order
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.depends_on.contains_key(id)
    }

    /// What `id` depends on. Empty for unknown IDs.
    pub fn dependencies_of(&self, id: &TaskId) -> &BTreeSet<TaskId> {
        self.depends_on.get(id).unwrap_or(&EMPTY)
    }

    /// Which tasks depend on `id`. `id` need not be a node itself.
    pub fn dependents_of(&self, id: &TaskId) -> &BTreeSet<TaskId> {
        self.dependents.get(id).unwrap_or(&EMPTY)
    }

    /// Number of foreign tasks seen while building.
    pub fn skipped_not_ralph(&self) -> usize {
        self.skipped_not_ralph
    }


    /// Every `(task, dependency)` edge.
    pub fn edges(&self) -> impl Iterator<Item = (&TaskId, &TaskId)> {
        self.depends_on
            .iter()
            .flat_map(|(task, deps)| deps.iter().map(move |dep| (task, dep)))
    }
}
