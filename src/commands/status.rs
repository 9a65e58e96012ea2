//! Implementation of the `ralph status` command.
//!
//! Read-only: lists every canonical task with its status, dependencies and
//! readiness, then the foreign task count and any dependency cycles.

use super::display::join_ids;
use super::open_tracker;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::graph::{DependencyGraph, DependencySource, find_cycles};
use crate::readiness::evaluate;
use crate::snapshot::Snapshot;
use crate::task::{TaskId, TaskStatus};
use std::collections::{BTreeMap, HashSet};

/// One row of the status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub dependencies: Vec<TaskId>,
    /// `ready`, `blocked` or empty for tasks that are not `todo`.
    pub readiness: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatusReport {
    /// Ascending by ID.
    pub rows: Vec<TaskRow>,
    pub counts: BTreeMap<&'static str, usize>,
    pub foreign: usize,
    pub cycles: Vec<Vec<TaskId>>,
}

/// Execute the `ralph status` command.
pub fn cmd_status(ctx: &ProjectContext) -> Result<()> {
    let mut tracker = open_tracker(ctx, None)?;
    let snapshot = Snapshot::fetch(&mut tracker)?;
    let report = build_status(&snapshot, ctx.config.dependency_source);
    print_status(&report);
    Ok(())
}

pub(crate) fn build_status(snapshot: &Snapshot, source: DependencySource) -> StatusReport {
    let graph = DependencyGraph::build(snapshot.tasks(), source);
    let readiness = evaluate(&graph, &snapshot.statuses());
    let ready: HashSet<&TaskId> = readiness.ready.iter().collect();
    let blocked: HashSet<&TaskId> = readiness.blocked.iter().map(|b| &b.id).collect();

    let mut report = StatusReport {
        foreign: snapshot.foreign_count(),
        cycles: find_cycles(&graph),
        ..Default::default()
    };

    for (id, task) in snapshot.ralph_tasks() {
        let readiness = if ready.contains(&id) {
            "ready"
        } else if blocked.contains(&id) {
            "blocked"
        } else {
            ""
        };
        *report.counts.entry(task.status.as_str()).or_insert(0) += 1;
        report.rows.push(TaskRow {
            dependencies: graph.dependencies_of(&id).iter().cloned().collect(),
            title: task.short_title().to_string(),
            status: task.status,
            readiness,
            id,
        });
    }
    report.rows.sort_by(|a, b| a.id.cmp(&b.id));
    report
}

fn print_status(report: &StatusReport) {
    println!("Task Status");
    println!("===========");
    println!();

    if report.rows.is_empty() {
        println!("No TASK-NNN tasks in this project.");
    }
    for row in &report.rows {
        let deps = if row.dependencies.is_empty() {
            String::new()
        } else {
            format!("  <- {}", join_ids(&row.dependencies))
        };
        println!(
            "  {:8}  {:10} {:7}  {}{}",
            row.id,
            row.status.as_str(),
            row.readiness,
            row.title,
            deps
        );
    }

    println!();
    println!("Counts:");
    for (status, count) in &report.counts {
        println!("  {:10} {:>3}", status, count);
    }
    println!("  {:10} {:>3}", "foreign", report.foreign);

    if !report.cycles.is_empty() {
        println!();
        println!("Dependency cycles ({}):", report.cycles.len());
        for cycle in &report.cycles {
            println!("  - {}", join_ids(cycle));
        }
    }
}
