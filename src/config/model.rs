//! Config struct definition and default implementation.

use super::types::*;
use crate::graph::DependencySource;
use serde::{Deserialize, Serialize};

/// Configuration for ralph.
///
/// This struct represents the contents of `config/ralph.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Project
    // =========================================================================
    /// Tracker project name. Required by every tracker phase unless
    /// `project_id` is set or `--project-name` is passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Tracker project ID. Skips the name lookup when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    // =========================================================================
    // Scheduling
    // =========================================================================
    /// Maximum workspace sessions started per `run` pass.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: u32,

    /// Executor profile passed to the tracker when starting a session.
    #[serde(default = "default_executor")]
    pub executor: String,

    /// Optional executor variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    pub repo_config: RepoConfig,

    /// Where dependency edges are read from.
    pub dependency_source: DependencySource,

    // =========================================================================
    // Collaborators
    // =========================================================================
    pub tracker: TrackerConfig,

    pub reviewer: ReviewerConfig,

    pub paths: PathsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: None,
            project_id: None,
            max_parallel: default_max_parallel(),
            executor: default_executor(),
            variant: None,
            repo_config: RepoConfig::default(),
            dependency_source: DependencySource::default(),
            tracker: TrackerConfig::default(),
            reviewer: ReviewerConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}
