//! Task model for ralph.
//!
//! Tasks live in an external kanban tracker; this module holds the local view
//! of one tracker record. Only tasks whose title carries a canonical
//! identifier (`TASK-NNN:`) are ever acted upon.
//!
//! Unknown fields sent by the tracker are preserved in `extra` so that an
//! archived snapshot is a faithful copy of what the tracker returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

mod id;

pub(crate) use id::EMBEDDED_ID_REGEX;
pub use id::{TaskId, find_ids, is_ralph_task};

/// Lifecycle status of a task in the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    InReview,
    Done,
    Cancelled,
}

impl TaskStatus {
    /// Wire name used by the tracker.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::InReview => "inreview",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status from its wire name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "inprogress" => Some(Self::InProgress),
            "inreview" => Some(Self::InReview),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task record as returned by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// The tracker's own identifier (a UUID for vibe-kanban).
    #[serde(rename = "id")]
    pub tracker_id: String,

    /// Display title. Canonical tasks start with `TASK-NNN:`.
    pub title: String,

    /// Free-text body. Trackers may send `null`; it is read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    pub status: TaskStatus,

    /// Structured dependency list, for trackers that support one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,

    /// Session started for this task, if any. Correlation only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Fields this tool does not interpret.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Task {
    /// Canonical identifier, or `None` for foreign tasks.
    pub fn ralph_id(&self) -> Option<TaskId> {
        TaskId::from_title(&self.title)
    }

    pub fn is_ralph_task(&self) -> bool {
        is_ralph_task(&self.title)
    }

    /// Title with the `TASK-NNN:` prefix stripped.
    pub fn short_title(&self) -> &str {
        let title = self.title.trim();
        match title.split_once(':') {
            Some((prefix, rest)) if is_ralph_task(title) && prefix.len() == 8 => rest.trim(),
            _ => title,
        }
    }
}

/// A partial update sent to the tracker.
///
/// Only fields that are `Some` are transmitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub description: Option<String>,
    pub dependencies: Option<Vec<String>>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.description.is_none() && self.dependencies.is_none()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
