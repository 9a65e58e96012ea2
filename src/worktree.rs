//! Git worktrees belonging to tasks.
//!
//! Workspace sessions run in linked worktrees whose branch and directory
//! are named after the task title, optionally behind a short hash (for
//! example `vk/3f2a-task-001-login`). Only the ID that leads that name
//! identifies the worktree's task; IDs mentioned later in the title do not.
//! Cleanup uses this module to find and remove them. The main worktree is
//! never a candidate, and dirty worktrees are refused rather than forced.

use crate::error::{RalphError, Result};
use crate::git::{has_worktree_changes, run_git};
use crate::task::TaskId;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// `task-NNN` at the start of a name segment, after an optional 4-hex hash.
static LEADING_TASK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[0-9a-f]{4}-)?task-(\d{3})(?:[^0-9a-z]|$)")
        .expect("Invalid leading task regex")
});

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    pub path: PathBuf,
    /// Checked-out branch without `refs/heads/`; `None` when detached.
    pub branch: Option<String>,
    pub head_sha: String,
    /// The first entry git lists is the main worktree.
    pub is_main: bool,
}

impl Worktree {
    /// The task this linked worktree was created for.
    ///
    /// Read from the last segment of the branch and from the directory name.
    /// When both name a task and disagree, the worktree belongs to neither.
    pub fn task_id(&self) -> Option<TaskId> {
        if self.is_main {
            return None;
        }
        let from_branch = self
            .branch
            .as_deref()
            .and_then(|b| b.rsplit('/').next())
            .and_then(leading_task_id);
        let from_dir = self
            .path
            .file_name()
            .and_then(|n| leading_task_id(&n.to_string_lossy()));

        match (from_branch, from_dir) {
            (Some(a), Some(b)) if a != b => None,
            (Some(a), _) => Some(a),
            (None, b) => b,
        }
    }

    /// Whether this linked worktree was created for `id`.
    pub fn belongs_to(&self, id: &TaskId) -> bool {
        self.task_id().as_ref() == Some(id)
    }
}

fn leading_task_id(segment: &str) -> Option<TaskId> {
    let caps = LEADING_TASK_REGEX.captures(segment)?;
    TaskId::parse(&format!("TASK-{}", &caps[1])).ok()
}

/// List all worktrees in the repository.
pub fn list_worktrees<P: AsRef<Path>>(repo_root: P) -> Result<Vec<Worktree>> {
    let output = run_git(repo_root, &["worktree", "list", "--porcelain"])?;
    Ok(parse_worktree_list(&output.stdout))
}

/// Parse porcelain output into worktree entries.
pub fn parse_worktree_list(porcelain: &str) -> Vec<Worktree> {
    let mut worktrees = Vec::new();
    let mut current_path: Option<PathBuf> = None;
    let mut current_head: Option<String> = None;
    let mut current_branch: Option<String> = None;

    let mut flush = |path: Option<PathBuf>, head: Option<String>, branch: Option<String>| {
        if let Some(path) = path {
            let is_main = worktrees.is_empty();
            worktrees.push(Worktree {
                path,
                branch,
                head_sha: head.unwrap_or_default(),
                is_main,
            });
        }
    };

    for line in porcelain.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            flush(
                current_path.take(),
                current_head.take(),
                current_branch.take(),
            );
            current_path = Some(PathBuf::from(path));
        } else if let Some(sha) = line.strip_prefix("HEAD ") {
            current_head = Some(sha.to_string());
        } else if let Some(branch_ref) = line.strip_prefix("branch ") {
            current_branch = Some(
                branch_ref
                    .strip_prefix("refs/heads/")
                    .unwrap_or(branch_ref)
                    .to_string(),
            );
        } else if line == "detached" {
            current_branch = None;
        }
    }
    flush(current_path, current_head, current_branch);

    worktrees
}

/// Pair each retired ID with the linked worktrees created for it.
pub fn worktrees_for(worktrees: &[Worktree], ids: &BTreeSet<TaskId>) -> Vec<(TaskId, Worktree)> {
    let mut matches: Vec<(TaskId, Worktree)> = worktrees
        .iter()
        .filter_map(|wt| {
            let id = wt.task_id()?;
            ids.contains(&id).then(|| (id, wt.clone()))
        })
        .collect();
    matches.sort_by(|a, b| a.0.cmp(&b.0));
    matches
}

/// Remove a linked worktree with `git worktree remove`.
///
/// Never forces: a worktree with local changes is refused.
pub fn remove_worktree<P: AsRef<Path>>(repo_root: P, worktree_path: &Path) -> Result<()> {
    if worktree_path.exists() && has_worktree_changes(worktree_path)? {
        return Err(RalphError::GitError(format!(
            "worktree '{}' has uncommitted changes; review and remove it manually",
            worktree_path.display()
        )));
    }

    let worktree_str = worktree_path.to_string_lossy();
    run_git(repo_root, &["worktree", "remove", &worktree_str]).map_err(|e| {
        RalphError::GitError(format!(
            "failed to remove worktree '{}': {}",
            worktree_str, e
        ))
    })?;

    Ok(())
}
