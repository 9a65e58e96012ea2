//! Implementation of the `ralph cleanup` command.
//!
//! # Safety
//!
//! - Default behavior is dry-run (prints the plan)
//! - Requires `--execute` to change anything, and a terminal confirmation
//!   unless `--yolo` is given
//! - Only tasks that are both in the implementation log and `done` are
//!   archived; foreign tasks are never edited
//! - Dirty worktrees are reported, never forced

use super::display::{print_cleanup_outcome, print_cleanup_plan};
use super::{Mode, dry_run_notice, open_tracker};
use crate::cleanup::{
    CleanupInput, CleanupLog, CleanupOutcome, CleanupPlan, CleanupTargets, execute, plan_cleanup,
};
use crate::context::{ProjectContext, operator};
use crate::error::{RalphError, Result};
use crate::review::ImplementationLog;
use crate::snapshot::Snapshot;
use crate::tracker::TaskTracker;
use crate::worktree::{Worktree, list_worktrees};
use std::io::{BufRead, IsTerminal, Write};

/// Execute the `ralph cleanup` command.
pub fn cmd_cleanup(ctx: &ProjectContext, mode: Mode) -> Result<()> {
    let mut tracker = open_tracker(ctx, None)?;
    let snapshot = Snapshot::fetch(&mut tracker)?;
    cleanup_pass(ctx, mode, &mut tracker, &snapshot, &mut confirm_on_terminal)?;
    Ok(())
}

/// Plan a cleanup against `snapshot` and, when allowed, execute it.
///
/// Returns the outcome when anything was executed.
pub(crate) fn cleanup_pass(
    ctx: &ProjectContext,
    mode: Mode,
    tracker: &mut dyn TaskTracker,
    snapshot: &Snapshot,
    confirm: &mut dyn FnMut(&CleanupPlan) -> Result<bool>,
) -> Result<Option<CleanupOutcome>> {
    let reviewed_ids = ImplementationLog::new(ctx.implementation_log_path()).reviewed_ids()?;
    let worktrees = task_worktrees(ctx);

    let plan = plan_cleanup(CleanupInput {
        reviewed_ids: &reviewed_ids,
        snapshot,
        worktrees: &worktrees,
        source: ctx.config.dependency_source,
        project: ctx.config.project_name.clone(),
        now: snapshot.fetched_at(),
    });

    if plan.is_empty() {
        println!("No reviewed tasks to clean up.");
        if !plan.skipped_not_done.is_empty() {
            print_cleanup_plan(&plan, &ctx.repo_root);
        }
        return Ok(None);
    }

    print_cleanup_plan(&plan, &ctx.repo_root);

    if !mode.execute {
        dry_run_notice("archive and remove these tasks");
        return Ok(None);
    }

    if !mode.yolo && !confirm(&plan)? {
        println!("Aborted: no changes made.");
        return Ok(None);
    }

    let log = CleanupLog::new(ctx.cleanup_log_path());
    let archive_dir = ctx.archive_dir();
    let operator = operator();
    let targets = CleanupTargets {
        repo_root: &ctx.repo_root,
        archive_dir: &archive_dir,
        log: &log,
        operator: &operator,
    };
    let outcome = execute(&plan, tracker, &targets)?;
    print_cleanup_outcome(&outcome, log.path());
    Ok(Some(outcome))
}

/// Ask on the terminal. Refuses outright when stdin is not a terminal.
pub(crate) fn confirm_on_terminal(plan: &CleanupPlan) -> Result<bool> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Err(RalphError::UserError(
            "cleanup needs confirmation but stdin is not a terminal\n\
             Fix: re-run with --yolo to skip the prompt."
                .to_string(),
        ));
    }

    print!(
        "\nArchive and delete {} task(s)? [y/N] ",
        plan.retired.len()
    );
    std::io::stdout()
        .flush()
        .map_err(|e| RalphError::UserError(format!("failed to write prompt: {}", e)))?;

    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(|e| RalphError::UserError(format!("failed to read answer: {}", e)))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Linked worktrees of the repository. Listing failures leave worktrees
/// out of the plan rather than blocking it.
fn task_worktrees(ctx: &ProjectContext) -> Vec<Worktree> {
    if !ctx.in_git_repo {
        return Vec::new();
    }
    match list_worktrees(&ctx.repo_root) {
        Ok(worktrees) => worktrees,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list worktrees, none will be removed");
            Vec::new()
        }
    }
}
