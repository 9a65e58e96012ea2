//! The older `config/ralph.json` layout.
//!
//! ```json
//! {
//!   "vibe_kanban": {
//!     "project_name": "shop",
//!     "executor": "CLAUDE_CODE",
//!     "variant": null,
//!     "repo_config": { "base_branch": "main" }
//!   }
//! }
//! ```
//!
//! Only the `vibe_kanban` section is read. Everything else takes defaults.

use super::model::Config;
use super::types::RepoConfig;
use crate::error::{RalphError, Result};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct LegacyFile {
    #[serde(default)]
    vibe_kanban: VibeKanbanSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VibeKanbanSection {
    project_name: Option<String>,
    project_id: Option<String>,
    executor: Option<String>,
    variant: Option<String>,
    repo_config: RepoConfig,
}

impl Config {
    /// Parse the legacy JSON layout.
    pub fn from_legacy_json(json: &str) -> Result<Self> {
        let legacy: LegacyFile = serde_json::from_str(json).map_err(|e| {
            RalphError::UserError(format!("failed to parse legacy config JSON: {}", e))
        })?;
        let section = legacy.vibe_kanban;

        let mut config = Config {
            project_name: section.project_name,
            project_id: section.project_id,
            variant: section.variant,
            repo_config: section.repo_config,
            ..Default::default()
        };
        if let Some(executor) = section.executor {
            config.executor = executor;
        }

        config.validate()?;
        Ok(config)
    }
}
