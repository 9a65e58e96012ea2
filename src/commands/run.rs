//! Implementation of the `ralph run` command.
//!
//! One progressive-execution pass: snapshot the tracker, rebuild the
//! dependency graph, start up to `max_parallel` ready tasks and move each
//! started task to `inprogress`. Re-running the command picks up tasks that
//! became ready since the last pass.

use super::display::{join_ids, print_scheduling_report};
use super::{Mode, dry_run_notice, open_tracker};
use crate::cli::RunArgs;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::graph::{DependencyGraph, DependencySource, find_cycles};
use crate::readiness::{BlockedTask, evaluate};
use crate::schedule::{SchedulingReport, schedule};
use crate::snapshot::Snapshot;
use crate::task::{TaskId, TaskStatus, TaskUpdate};
use crate::tracker::{TaskTracker, WorkspaceRequest};

/// Result of one `run` pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunOutcome {
    pub report: SchedulingReport,
    pub blocked: Vec<BlockedTask>,
    pub cycles: Vec<Vec<TaskId>>,
    /// Started, but still `todo` in the tracker: the next pass would start
    /// them again.
    pub status_update_failed: Vec<(TaskId, String)>,
}

/// Execute the `ralph run` command.
pub fn cmd_run(ctx: &ProjectContext, mode: Mode, args: RunArgs) -> Result<()> {
    let mut tracker = open_tracker(ctx, args.project_name.as_deref())?;
    let max_parallel = args.max_parallel.unwrap_or(ctx.config.max_parallel) as usize;
    let request = ctx.workspace_request();

    let outcome = run_pass(
        &mut tracker,
        &request,
        ctx.config.dependency_source,
        max_parallel,
        mode.execute,
    )?;

    print_scheduling_report(&outcome.report, &outcome.blocked, mode.execute);
    if !outcome.status_update_failed.is_empty() {
        println!();
        println!(
            "Started but not moved to inprogress ({}); set them by hand before the next run:",
            outcome.status_update_failed.len()
        );
        for (id, error) in &outcome.status_update_failed {
            println!("  - {}: {}", id, error);
        }
    }
    for cycle in &outcome.cycles {
        println!();
        println!("Dependency cycle, never ready: {}", join_ids(cycle));
    }
    if !mode.execute && !outcome.report.started.is_empty() {
        dry_run_notice("start these sessions");
    }

    Ok(())
}

/// One pass against `tracker`. In a dry run nothing is started but the
/// bound still applies, so the report shows exactly what would start.
pub(crate) fn run_pass(
    tracker: &mut dyn TaskTracker,
    request: &WorkspaceRequest,
    source: DependencySource,
    max_parallel: usize,
    execute: bool,
) -> Result<RunOutcome> {
    let snapshot = Snapshot::fetch(tracker)?;
    let graph = DependencyGraph::build(snapshot.tasks(), source);

    let cycles = find_cycles(&graph);
    for cycle in &cycles {
        tracing::warn!(tasks = %join_ids(cycle), "dependency cycle, these tasks can never become ready");
    }

    let readiness = evaluate(&graph, &snapshot.statuses());
    tracing::info!(
        ready = readiness.ready.len(),
        blocked = readiness.blocked.len(),
        max_parallel,
        "evaluated readiness"
    );

    let mut status_update_failed = Vec::new();
    let report = schedule(&snapshot, &readiness, max_parallel, |id, task| {
        if !execute {
            return Ok(String::new());
        }
        let session_id = tracker.start_workspace_session(&task.tracker_id, request)?;
        let update = TaskUpdate::status(TaskStatus::InProgress);
        if let Err(e) = tracker.update_task(&task.tracker_id, &update) {
            // The session is running; the start itself succeeded.
            tracing::warn!(task = %id, error = %e, "session started but status update failed");
            status_update_failed.push((id.clone(), e.to_string()));
        }
        Ok(session_id)
    });

    Ok(RunOutcome {
        report,
        blocked: readiness.blocked,
        cycles,
        status_update_failed,
    })
}
