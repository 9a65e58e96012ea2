//! Implementation of the `ralph review` command.
//!
//! Summarizes every done task that is not yet in the implementation log,
//! appends the summaries, then hands the same snapshot to cleanup.

use super::cleanup::{cleanup_pass, confirm_on_terminal};
use super::display::print_review_report;
use super::{Mode, dry_run_notice, open_tracker};
use crate::cli::ReviewArgs;
use crate::context::{ProjectContext, operator};
use crate::error::Result;
use crate::review::{AgentSummarizer, ImplementationLog, ReviewReport, Summarizer, review};
use crate::snapshot::Snapshot;
use crate::task::{Task, TaskStatus};

/// Execute the `ralph review` command.
pub fn cmd_review(ctx: &ProjectContext, mode: Mode, args: ReviewArgs) -> Result<()> {
    let mut tracker = open_tracker(ctx, None)?;
    let snapshot = Snapshot::fetch(&mut tracker)?;
    let log = ImplementationLog::new(ctx.implementation_log_path());
    let mut summarizer = AgentSummarizer::new(ctx.config.reviewer.clone(), &ctx.repo_root);

    let report = review_pass(&snapshot, &log, &mut summarizer, mode.execute, &operator())?;
    print_review_report(&report, log.path(), mode.execute);
    if !mode.execute && !report.records.is_empty() {
        dry_run_notice("write these summaries");
    }

    if args.no_cleanup {
        return Ok(());
    }
    println!();
    cleanup_pass(ctx, mode, &mut tracker, &snapshot, &mut confirm_on_terminal)?;
    Ok(())
}

/// Review the done tasks of `snapshot` against `log`.
///
/// In a dry run the summarizer is not called and the log is not written;
/// the report lists what would be reviewed.
pub(crate) fn review_pass(
    snapshot: &Snapshot,
    log: &ImplementationLog,
    summarizer: &mut dyn Summarizer,
    execute: bool,
    reviewer: &str,
) -> Result<ReviewReport> {
    let already_reviewed = log.reviewed_ids()?;
    let done: Vec<&Task> = snapshot
        .tasks()
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .collect();

    if !execute {
        return Ok(review(&done, &already_reviewed, |_, _| Ok(String::new())));
    }

    let report = review(&done, &already_reviewed, |id, task| {
        summarizer.summarize(id, task)
    });
    log.append(&report.records, reviewer)?;
    Ok(report)
}
