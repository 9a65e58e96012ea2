//! Command implementations for ralph.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each command resolves the project context, connects to
//! the tracker and runs exactly one pass over a fresh snapshot.

mod cleanup;
mod display;
mod review;
mod run;
mod status;


use crate::cli::{Cli, Command};
use crate::context::ProjectContext;
use crate::error::Result;
use crate::tracker::McpTracker;

/// Flags that apply to every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mode {
    /// Perform external mutations.
    pub execute: bool,
    /// Skip confirmation prompts.
    pub yolo: bool,
}

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let mode = Mode {
        execute: cli.execute,
        yolo: cli.yolo,
    };
    let ctx = ProjectContext::resolve(cli.config.as_deref())?;

    if !mode.execute {
        tracing::debug!("dry run: no tracker or git mutations");
    }

    match cli.command {
        Command::Run(args) => run::cmd_run(&ctx, mode, args),
        Command::Review(args) => review::cmd_review(&ctx, mode, args),
        Command::Cleanup => cleanup::cmd_cleanup(&ctx, mode),
        Command::Status => status::cmd_status(&ctx),
    }
}

/// Start the tracker's MCP server and select the project.
///
/// A `--project-name` override replaces both configured project fields.
fn open_tracker(ctx: &ProjectContext, project_name: Option<&str>) -> Result<McpTracker> {
    let mut tracker = McpTracker::connect(&ctx.config.tracker, &ctx.repo_root)?;
    match project_name {
        Some(name) => tracker.select_project(None, Some(name))?,
        None => tracker.select_project(
            ctx.config.project_id.as_deref(),
            ctx.config.project_name.as_deref(),
        )?,
    };
    Ok(tracker)
}

fn dry_run_notice(flag_hint: &str) {
    println!();
    println!("Dry-run mode: no changes made.");
    println!("Run with --execute to {}.", flag_hint);
}
