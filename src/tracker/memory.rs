//! In-memory tracker for tests.
//!
//! Applies every mutation to its own task list, so a second snapshot sees
//! the effect of the first pass, and records each call for assertions.

use super::{TaskTracker, WorkspaceRequest};
use crate::error::{RalphError, Result};
use crate::task::{Task, TaskStatus, TaskUpdate};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(Option<TaskStatus>),
    Get(String),
    Update(String, TaskUpdate),
    Delete(String),
    Start(String),
}

#[derive(Debug, Default)]
pub(crate) struct MemoryTracker {
    pub tasks: Vec<Task>,
    pub calls: Vec<Call>,
    /// Tracker IDs whose session start fails.
    pub failing_starts: HashSet<String>,
    /// Tracker IDs whose updates fail.
    pub failing_updates: HashSet<String>,
    /// Every call fails as if the server were down.
    pub offline: bool,
    sessions_started: u32,
}

impl MemoryTracker {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Default::default()
        }
    }

    pub fn fail_start_for(mut self, tracker_id: &str) -> Self {
        self.failing_starts.insert(tracker_id.to_string());
        self
    }

    pub fn fail_update_for(mut self, tracker_id: &str) -> Self {
        self.failing_updates.insert(tracker_id.to_string());
        self
    }

    pub fn task(&self, tracker_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.tracker_id == tracker_id)
    }

    /// Tracker IDs touched by an update, delete or start.
    pub fn mutated_ids(&self) -> HashSet<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Update(id, _) | Call::Delete(id) | Call::Start(id) => Some(id.clone()),
                Call::List(_) | Call::Get(_) => None,
            })
            .collect()
    }

    pub fn start_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Start(_)))
            .count()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            Err(RalphError::TrackerError("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn find_mut(&mut self, tracker_id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.tracker_id == tracker_id)
            .ok_or_else(|| RalphError::TrackerError(format!("task '{}' not found", tracker_id)))
    }
}

impl TaskTracker for MemoryTracker {
    fn list_tasks(&mut self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        self.check_online()?;
        self.calls.push(Call::List(status));
        Ok(self
            .tasks
            .iter()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .cloned()
            .collect())
    }

    fn get_task(&mut self, tracker_id: &str) -> Result<Task> {
        self.check_online()?;
        self.calls.push(Call::Get(tracker_id.to_string()));
        Ok(self.find_mut(tracker_id)?.clone())
    }

    fn update_task(&mut self, tracker_id: &str, update: &TaskUpdate) -> Result<()> {
        self.check_online()?;
        self.calls
            .push(Call::Update(tracker_id.to_string(), update.clone()));
        if self.failing_updates.contains(tracker_id) {
            return Err(RalphError::TrackerError(format!(
                "update of '{}' rejected",
                tracker_id
            )));
        }
        let task = self.find_mut(tracker_id)?;
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(description) = &update.description {
            task.description = description.clone();
        }
        if let Some(dependencies) = &update.dependencies {
            task.dependencies = Some(dependencies.clone());
        }
        Ok(())
    }

    fn delete_task(&mut self, tracker_id: &str) -> Result<()> {
        self.check_online()?;
        self.calls.push(Call::Delete(tracker_id.to_string()));
        self.find_mut(tracker_id)?;
        self.tasks.retain(|t| t.tracker_id != tracker_id);
        Ok(())
    }

    fn start_workspace_session(
        &mut self,
        tracker_id: &str,
        _request: &WorkspaceRequest,
    ) -> Result<String> {
        self.check_online()?;
        self.calls.push(Call::Start(tracker_id.to_string()));
        if self.failing_starts.contains(tracker_id) {
            return Err(RalphError::TrackerError(format!(
                "no free executor for '{}'",
                tracker_id
            )));
        }
        self.sessions_started += 1;
        let session = format!("session-{}", self.sessions_started);
        self.find_mut(tracker_id)?.workspace_session_id = Some(session.clone());
        Ok(session)
    }
}
