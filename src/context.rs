//! Project context resolution.
//!
//! Finds the repository a command runs against, loads its config and turns
//! the configured relative paths into absolute ones. Running from inside a
//! linked task worktree resolves to the main worktree, so logs and archives
//! always land in one place.

use crate::config::{Config, DEFAULT_CONFIG_PATH, LEGACY_CONFIG_PATH, RepoConfig};
use crate::error::{RalphError, Result};
use crate::git;
use crate::tracker::WorkspaceRequest;
use crate::worktree::list_worktrees;
use std::env;
use std::path::{Path, PathBuf};

/// Base branch used when none is configured and HEAD is detached.
pub const FALLBACK_BASE_BRANCH: &str = "main";

/// Everything a command needs to know about where it runs.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Main worktree of the repository, or the working directory outside
    /// of one.
    pub repo_root: PathBuf,

    /// Whether `repo_root` is a git repository.
    pub in_git_repo: bool,

    /// Config file that was (or would have been) read.
    pub config_path: PathBuf,

    pub config: Config,
}

impl ProjectContext {
    /// Resolve from the current working directory.
    pub fn resolve(config_override: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            RalphError::UserError(format!("failed to get current working directory: {}", e))
        })?;
        Self::resolve_from(&cwd, config_override)
    }

    /// Resolve from `cwd`.
    ///
    /// An explicit config path must exist; the default one may be missing,
    /// in which case the legacy JSON file is tried and then defaults apply.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P, config_override: Option<&Path>) -> Result<Self> {
        let cwd = cwd.as_ref();
        let (repo_root, in_git_repo) = match git::get_repo_root(cwd) {
            Some(toplevel) => (main_worktree(&toplevel).unwrap_or(toplevel), true),
            None => (cwd.to_path_buf(), false),
        };

        let (config_path, config) = match config_override {
            Some(path) => {
                let path = absolutize(cwd, path);
                let config = Config::load(&path)?;
                (path, config)
            }
            None => {
                let path = default_config_path(&repo_root);
                let config = Config::load_or_default(&path)?;
                (path, config)
            }
        };

        tracing::debug!(
            repo_root = %repo_root.display(),
            config = %config_path.display(),
            "resolved project context"
        );

        Ok(Self {
            repo_root,
            in_git_repo,
            config_path,
            config,
        })
    }

    pub fn implementation_log_path(&self) -> PathBuf {
        absolutize(&self.repo_root, Path::new(&self.config.paths.implementation_log))
    }

    pub fn cleanup_log_path(&self) -> PathBuf {
        absolutize(&self.repo_root, Path::new(&self.config.paths.cleanup_log))
    }

    pub fn archive_dir(&self) -> PathBuf {
        absolutize(&self.repo_root, Path::new(&self.config.paths.archive_dir))
    }

    /// Configured base branch, else the branch checked out at the repo
    /// root, else `main`.
    pub fn base_branch(&self) -> String {
        if let Some(branch) = &self.config.repo_config.base_branch
            && !branch.trim().is_empty()
        {
            return branch.clone();
        }
        if self.in_git_repo
            && let Ok(Some(branch)) = git::current_branch(&self.repo_root)
        {
            return branch;
        }
        FALLBACK_BASE_BRANCH.to_string()
    }

    /// Session parameters for `start_workspace_session`.
    pub fn workspace_request(&self) -> WorkspaceRequest {
        WorkspaceRequest {
            executor: self.config.executor.clone(),
            variant: self.config.variant.clone(),
            repo: RepoConfig {
                repo_id: self.config.repo_config.repo_id.clone(),
                base_branch: Some(self.base_branch()),
            },
        }
    }
}

/// `user@host` of whoever runs the command.
pub fn operator() -> String {
    let user = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{}@{}", user, host)
}

/// The first worktree git lists is the main one.
fn main_worktree(toplevel: &Path) -> Option<PathBuf> {
    let main = list_worktrees(toplevel)
        .ok()?
        .into_iter()
        .find(|wt| wt.is_main)?
        .path;
    main.exists().then_some(main)
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `config/ralph.yaml`, unless only the legacy `config/ralph.json` exists.
fn default_config_path(repo_root: &Path) -> PathBuf {
    let path = repo_root.join(DEFAULT_CONFIG_PATH);
    let legacy = repo_root.join(LEGACY_CONFIG_PATH);
    if !path.exists() && legacy.exists() {
        tracing::info!(path = %legacy.display(), "using legacy JSON config");
        return legacy;
    }
    path
}
