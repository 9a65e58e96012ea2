//! Ralph: dependency-aware progressive execution over a kanban tracker.
//!
//! This is the main entry point for the `ralph` CLI. It parses arguments,
//! sets up logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

mod agent;
mod cleanup;
mod cli;
mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod git;
pub mod graph;
mod logging;
pub mod readiness;
mod review;
pub mod schedule;
pub mod snapshot;
pub mod task;
mod tracker;
pub mod worktree;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(err) = logging::init_logging(cli.log_level) {
        eprintln!("Error: {}", err);
        return ExitCode::from(exit_codes::USER_ERROR as u8);
    }

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
