use crate::task::{Task, TaskId, TaskStatus};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// A repository on `main` with one commit, ready for `git worktree add`.
///
/// `.worktrees/` is ignored so linked worktrees created by tests do not
/// dirty the main checkout.
pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    // Unborn `main` regardless of the machine's init.defaultBranch.
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(path, &["config", "user.email", "ralph@example.com"]);
    git(path, &["config", "user.name", "Ralph Test"]);

    std::fs::write(path.join("README.md"), "# Board\n").unwrap();
    std::fs::write(path.join(".gitignore"), ".worktrees/\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    temp_dir
}

fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}

/// A tracker record. The tracker ID is derived from the title prefix, so
/// `"TASK-001: A"` gets `uuid-task-001` and `"Fix bug"` gets `uuid-fix-bug`.
pub(crate) fn task(title: &str, status: TaskStatus, description: &str) -> Task {
    let prefix = title.split(':').next().unwrap_or(title).trim();
    Task {
        tracker_id: format!("uuid-{}", prefix.to_lowercase().replace(' ', "-")),
        title: title.to_string(),
        description: description.to_string(),
        status,
        dependencies: None,
        workspace_session_id: None,
        updated_at: None,
        extra: BTreeMap::new(),
    }
}

pub(crate) fn id(raw: &str) -> TaskId {
    TaskId::parse(raw).unwrap()
}

/// A repo with one worktree per branch under `<repo>/.worktrees/<name>`.
pub(crate) fn add_worktree(repo: &Path, name: &str, branch: &str) -> PathBuf {
    let path = repo.join(".worktrees").join(name);
    let path_str = path.to_string_lossy().to_string();
    git(repo, &["worktree", "add", "-b", branch, &path_str]);
    path
}
