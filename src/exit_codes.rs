//! Exit code constants for the ralph CLI.
//!
//! - 0: Success (including passes with per-task failures, which are reported)
//! - 1: User error (bad args, invalid config, missing files)
//! - 2: Task tracker unavailable or protocol failure (pass aborted)
//! - 3: Git operation failure
//! - 4: Coding-agent invocation failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration or state.
pub const USER_ERROR: i32 = 1;

/// The external task tracker could not be reached or answered garbage.
pub const TRACKER_FAILURE: i32 = 2;

/// Git operation failure.
pub const GIT_FAILURE: i32 = 3;

/// The coding-agent CLI could not be run.
pub const AGENT_FAILURE: i32 = 4;
