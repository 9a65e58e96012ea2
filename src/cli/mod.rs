//! CLI argument parsing for ralph.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Ralph: progressive execution of a dependency-ordered task board.
///
/// Tasks titled `TASK-NNN: ...` live in a vibe-kanban project. Each pass
/// reads live state from the tracker, acts on it and exits:
/// - `run` starts workspace sessions for tasks whose dependencies are done
/// - `review` records summaries of finished tasks in the implementation log
/// - `cleanup` archives reviewed tasks and unblocks their dependents
///
/// Nothing outside this repository is changed without `--execute`.
#[derive(Parser, Debug)]
#[command(name = "ralph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Perform tracker and git mutations. Without it every command is a
    /// dry run that prints what it would do.
    #[arg(long, global = true)]
    pub execute: bool,

    /// Skip confirmation prompts.
    #[arg(long, global = true)]
    pub yolo: bool,

    /// Config file (default: config/ralph.yaml in the repository root).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log verbosity. Overrides RALPH_LOG.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for ralph.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start workspace sessions for ready tasks.
    ///
    /// A task is ready when it is todo and every dependency is done.
    /// At most max_parallel sessions are started per pass.
    Run(RunArgs),

    /// Summarize completed tasks into the implementation log.
    ///
    /// Tasks already in the log are skipped. Runs cleanup afterwards
    /// unless --no-cleanup is given.
    Review(ReviewArgs),

    /// Archive reviewed tasks and strip them from remaining dependencies.
    ///
    /// Only tasks that are both in the implementation log and done are
    /// touched. Their worktrees and tracker records are removed.
    Cleanup,

    /// Show every task with its dependencies and readiness.
    ///
    /// Read-only. Also reports foreign tasks and dependency cycles.
    Status,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Tracker project name (overrides project_name in config).
    #[arg(long)]
    pub project_name: Option<String>,

    /// Maximum sessions to start in this pass (overrides max_parallel).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_parallel: Option<u32>,
}

/// Arguments for the `review` command.
#[derive(Parser, Debug, Default)]
pub struct ReviewArgs {
    /// Do not run cleanup after reviewing.
    #[arg(long)]
    pub no_cleanup: bool,
}

/// Log verbosity levels accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
