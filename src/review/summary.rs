//! Review summaries from the coding agent.

use crate::agent::{render_command, render_template, run_agent, vars};
use crate::config::ReviewerConfig;
use crate::error::{RalphError, Result};
use crate::task::{Task, TaskId};
use std::path::PathBuf;

/// Produces the prose summary for a completed task. Opaque to the review
/// logic; only success or failure matters.
pub trait Summarizer {
    fn summarize(&mut self, id: &TaskId, task: &Task) -> Result<String>;
}

/// Asks the configured agent CLI for a summary.
pub struct AgentSummarizer {
    config: ReviewerConfig,
    cwd: PathBuf,
}

impl AgentSummarizer {
    pub fn new(config: ReviewerConfig, cwd: impl Into<PathBuf>) -> Self {
        Self {
            config,
            cwd: cwd.into(),
        }
    }

    /// The prompt sent for `task`.
    pub fn prompt_for(&self, id: &TaskId, task: &Task) -> Result<String> {
        let variables = vars([
            ("task_id", id.as_str()),
            ("title", task.short_title()),
            ("description", task.description.as_str()),
        ]);
        render_template(&self.config.prompt_template, &variables).map_err(|e| {
            RalphError::UserError(format!("invalid reviewer.prompt_template: {}", e))
        })
    }

    /// The argument vector for `task`.
    pub fn command_for(&self, id: &TaskId, task: &Task) -> Result<Vec<String>> {
        let prompt = self.prompt_for(id, task)?;
        let variables = vars([("model", self.config.model.as_str()), ("prompt", prompt.as_str())]);
        render_command(&self.config.command, &variables)
    }
}

impl Summarizer for AgentSummarizer {
    fn summarize(&mut self, id: &TaskId, task: &Task) -> Result<String> {
        let argv = self.command_for(id, task)?;
        let timeout = self.config.timeout();
        let output = run_agent(&argv, &self.cwd, timeout)?;
        tracing::info!(
            task = %id,
            elapsed_ms = output.duration.as_millis() as u64,
            "reviewer finished"
        );

        let summary = output.stdout.trim();
        if summary.is_empty() {
            let stderr = output.stderr.trim();
            return Err(RalphError::AgentError(if stderr.is_empty() {
                format!("reviewer returned an empty summary for {}", id)
            } else {
                format!(
                    "reviewer returned an empty summary for {}\nstderr: {}",
                    id, stderr
                )
            }));
        }
        Ok(summary.to_string())
    }
}
