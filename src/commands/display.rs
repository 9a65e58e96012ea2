//! Report printing for command output. Reports go to stdout.

use crate::cleanup::{CleanupOutcome, CleanupPlan, Removal};
use crate::readiness::BlockedTask;
use crate::review::ReviewReport;
use crate::schedule::SchedulingReport;
use crate::task::TaskId;
use std::path::Path;

pub fn print_scheduling_report(report: &SchedulingReport, blocked: &[BlockedTask], execute: bool) {
    let verb = if execute { "Started" } else { "Would start" };

    println!("{} ({}):", verb, report.started.len());
    for started in &report.started {
        if started.session_id.is_empty() {
            println!("  - {}", started.id);
        } else {
            println!("  - {} (session {})", started.id, started.session_id);
        }
    }

    if !report.failed.is_empty() {
        println!();
        println!("Failed to start ({}):", report.failed.len());
        for (id, error) in &report.failed {
            println!("  - {}: {}", id, error);
        }
    }

    if !report.deferred.is_empty() {
        println!();
        println!(
            "Ready but over the parallel limit ({}): {}",
            report.deferred.len(),
            join_ids(&report.deferred)
        );
    }

    if !blocked.is_empty() {
        println!();
        println!("Blocked ({}):", blocked.len());
        for task in blocked {
            println!("  - {} waiting on {}", task.id, join_ids(&task.waiting_on));
        }
    }

    if report.skipped_not_ralph > 0 {
        println!();
        println!("Skipped {} task(s) without a TASK-NNN title.", report.skipped_not_ralph);
    }
}

pub fn print_review_report(report: &ReviewReport, log_path: &Path, execute: bool) {
    let verb = if execute { "Reviewed" } else { "Would review" };

    println!("{} ({}):", verb, report.records.len());
    for record in &report.records {
        println!("  - {}: {}", record.task_id, record.title);
    }
    if execute && !report.records.is_empty() {
        println!("Appended to {}", log_path.display());
    }

    if !report.failed.is_empty() {
        println!();
        println!("Failed to review ({}):", report.failed.len());
        for (id, error) in &report.failed {
            println!("  - {}: {}", id, error);
        }
    }

    if !report.already_reviewed.is_empty() {
        println!();
        println!(
            "Already in the log ({}): {}",
            report.already_reviewed.len(),
            join_ids(&report.already_reviewed)
        );
    }

    if report.skipped_not_ralph > 0 {
        println!();
        println!("Skipped {} task(s) without a TASK-NNN title.", report.skipped_not_ralph);
    }
}

pub fn print_cleanup_plan(plan: &CleanupPlan, repo_root: &Path) {
    println!("Cleanup plan:");
    println!();
    println!("Archive ({}): {}", plan.retired.len(), join_ids(&plan.retired));

    if !plan.edits.is_empty() {
        println!();
        println!("Dependency edits ({}):", plan.edits.len());
        for edit in &plan.edits {
            println!("  - {}: remove {}", edit.task_id, join_ids(&edit.removed));
        }
    }

    let worktrees: Vec<&Removal> = plan
        .removals
        .iter()
        .filter(|r| matches!(r, Removal::Worktree { .. }))
        .collect();
    if !worktrees.is_empty() {
        println!();
        println!("Worktrees to remove ({}):", worktrees.len());
        for removal in worktrees {
            if let Removal::Worktree { task_id, path, branch } = removal {
                let branch_info = branch
                    .as_ref()
                    .map(|b| format!(" [branch: {}]", b))
                    .unwrap_or_default();
                println!(
                    "  - {}{} ({})",
                    make_relative(path, repo_root),
                    branch_info,
                    task_id
                );
            }
        }
    }

    let deletions: Vec<&TaskId> = plan
        .removals
        .iter()
        .filter_map(|r| match r {
            Removal::TrackerTask { task_id, .. } => Some(task_id),
            Removal::Worktree { .. } => None,
        })
        .collect();
    if !deletions.is_empty() {
        println!();
        println!("Tracker tasks to delete ({}):", deletions.len());
        for id in deletions {
            println!("  - {}", id);
        }
    }

    if !plan.skipped_not_done.is_empty() {
        println!();
        println!(
            "Reviewed but not done, left alone ({}): {}",
            plan.skipped_not_done.len(),
            join_ids(&plan.skipped_not_done)
        );
    }
}

pub fn print_cleanup_outcome(outcome: &CleanupOutcome, log_path: &Path) {
    println!();
    println!("Cleanup complete:");
    if let Some(path) = &outcome.archive_path {
        println!("  Archived: {} task(s) to {}", outcome.retired.len(), path.display());
    }
    println!("  Edited: {} task(s)", outcome.edited.len());
    println!("  Removed worktrees: {}", outcome.removed_worktrees.len());
    println!("  Deleted: {} task(s)", outcome.deleted.len());
    if !outcome.failures.is_empty() {
        println!("  Failed: {} item(s)", outcome.failures.len());
        for failure in &outcome.failures {
            println!("    - {}: {}", failure.item, failure.error);
        }
    }
    println!("  Log: {}", log_path.display());
}

/// Make a path relative to repo_root for display.
pub fn make_relative(path: &Path, repo_root: &Path) -> String {
    path.strip_prefix(repo_root)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string())
}

pub fn join_ids<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a TaskId>,
{
    let joined: Vec<&str> = ids.into_iter().map(TaskId::as_str).collect();
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined.join(", ")
    }
}
