//! Cycle diagnostics.
//!
//! Cycles never abort a pass: tasks on a cycle simply never become ready.
//! This only names them so the operator can fix the descriptions.

use super::DependencyGraph;
use crate::task::TaskId;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

/// Groups of tasks that depend on each other in a loop.
///
/// Each group is sorted; groups are ordered by their smallest member.
/// Edges to tasks outside the graph are ignored.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Vec<TaskId>> {
    let mut dag: DiGraphMap<&TaskId, ()> = DiGraphMap::new();

    for id in graph.tasks() {
        dag.add_node(id);
    }
    for (task, dep) in graph.edges() {
        if graph.contains(dep) {
            dag.add_edge(task, dep, ());
        }
    }

    let mut cycles: Vec<Vec<TaskId>> = tarjan_scc(&dag)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut ids: Vec<TaskId> = scc.into_iter().cloned().collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();
    cycles
}
