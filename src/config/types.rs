//! Configuration sections and defaults for ralph.
//!
//! This module defines the nested config sections, the constants and the
//! default value functions used by the Config struct.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default config file location, relative to the repository root.
pub const DEFAULT_CONFIG_PATH: &str = "config/ralph.yaml";

/// Older JSON config, read when the YAML one is absent.
pub const LEGACY_CONFIG_PATH: &str = "config/ralph.json";

/// Default prompt handed to the reviewer agent for each completed task.
pub const DEFAULT_REVIEW_PROMPT: &str = "\
You are reviewing completed task {task_id}: {title}.

Task description:
{description}

Write an implementation summary in markdown (150-300 words). Cover what was \
built, the key technical decisions and any tests or documentation updated. \
Output only the summary.";

/// Repository the tracker opens workspace sessions against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Tracker-side repository identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_id: Option<String>,

    /// Branch sessions start from. Detected from HEAD when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
}

/// How to reach the task tracker's MCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Command line that starts the MCP server on stdio.
    #[serde(default = "default_tracker_command")]
    pub command: String,

    /// Upper bound on each request/response round trip.
    #[serde(default = "default_tracker_timeout")]
    pub timeout_seconds: u64,
}

impl TrackerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            command: default_tracker_command(),
            timeout_seconds: default_tracker_timeout(),
        }
    }
}

/// How to invoke the coding agent that writes review summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewerConfig {
    /// Command template. `{model}` and `{prompt}` are substituted per word.
    #[serde(default = "default_reviewer_command")]
    pub command: String,

    #[serde(default = "default_reviewer_model")]
    pub model: String,

    #[serde(default = "default_reviewer_timeout")]
    pub timeout_seconds: u64,

    /// Prompt template. `{task_id}`, `{title}` and `{description}` are
    /// substituted.
    #[serde(default = "default_review_prompt")]
    pub prompt_template: String,
}

impl ReviewerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ReviewerConfig {
    fn default() -> Self {
        Self {
            command: default_reviewer_command(),
            model: default_reviewer_model(),
            timeout_seconds: default_reviewer_timeout(),
            prompt_template: default_review_prompt(),
        }
    }
}

/// Locations of the logs and the archive store, relative to the repo root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    #[serde(default = "default_implementation_log")]
    pub implementation_log: String,

    #[serde(default = "default_cleanup_log")]
    pub cleanup_log: String,

    #[serde(default = "default_archive_dir")]
    pub archive_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            implementation_log: default_implementation_log(),
            cleanup_log: default_cleanup_log(),
            archive_dir: default_archive_dir(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

pub(super) fn default_max_parallel() -> u32 {
    3
}

pub(super) fn default_executor() -> String {
    "CLAUDE_CODE".to_string()
}

fn default_tracker_command() -> String {
    "npx -y vibe-kanban@latest --mcp".to_string()
}

fn default_tracker_timeout() -> u64 {
    60
}

fn default_reviewer_command() -> String {
    "copilot --model {model} --no-color -p {prompt}".to_string()
}

fn default_reviewer_model() -> String {
    "claude-haiku-4.5".to_string()
}

fn default_reviewer_timeout() -> u64 {
    300
}

fn default_review_prompt() -> String {
    DEFAULT_REVIEW_PROMPT.to_string()
}

fn default_implementation_log() -> String {
    "docs/implementation-log.md".to_string()
}

fn default_cleanup_log() -> String {
    "docs/cleanup-log.md".to_string()
}

fn default_archive_dir() -> String {
    "plans/done".to_string()
}
