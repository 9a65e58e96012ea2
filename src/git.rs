//! Git command runner for ralph.
//!
//! Provides a wrapper around git commands with captured stdout/stderr and
//! structured error handling. All git operations go through this module.

use crate::error::{RalphError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }
}

/// Run a git command with the specified working directory.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(RalphError::GitError)` - On spawn failure or non-zero exit code
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            RalphError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(RalphError::GitError(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Repository root of `cwd` via `git rev-parse --show-toplevel`.
///
/// Returns `None` outside a repository or when git is not installed.
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Option<PathBuf> {
    match run_git(cwd, &["rev-parse", "--show-toplevel"]) {
        Ok(output) if !output.is_empty() => Some(PathBuf::from(output.stdout)),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "not inside a git repository");
            None
        }
    }
}

/// Name of the branch checked out in `cwd` (`git rev-parse --abbrev-ref HEAD`).
///
/// Returns `None` for a detached HEAD.
pub fn current_branch<P: AsRef<Path>>(cwd: P) -> Result<Option<String>> {
    let output = run_git(cwd, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    if output.stdout == "HEAD" || output.is_empty() {
        Ok(None)
    } else {
        Ok(Some(output.stdout))
    }
}

/// Whether the checkout at `cwd` has modified, staged or untracked files.
///
/// Untracked files count: `git worktree remove` refuses to drop them too.
pub fn has_worktree_changes<P: AsRef<Path>>(cwd: P) -> Result<bool> {
    let output = run_git(cwd, &["status", "--porcelain"])?;
    Ok(!output.is_empty())
}
