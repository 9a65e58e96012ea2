//! Canonical task identifiers.
//!
//! A Ralph task carries an identifier of the form `TASK-NNN` (exactly three
//! digits) at the start of its title, followed by a colon. Tasks without one
//! are foreign: they belong to a human and are never touched.

use crate::error::{RalphError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// A title that opens with a canonical identifier: `TASK-001: ...`.
static TITLE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TASK-(\d{3}):").expect("Invalid title ID regex"));

/// A bare canonical identifier.
static TASK_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TASK-\d{3}$").expect("Invalid task ID regex"));

/// Canonical identifiers embedded anywhere in free text, as whole tokens.
pub(crate) static EMBEDDED_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bTASK-\d{3}\b").expect("Invalid embedded ID regex"));

/// A canonical task identifier (`TASK-NNN`).
///
/// Ordering follows the numeric suffix because every identifier has exactly
/// three zero-padded digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Parse a bare identifier such as `TASK-007`.
    ///
    /// Case-sensitive: `task-007` is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        if TASK_ID_REGEX.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(RalphError::UserError(format!(
                "invalid task ID '{}': must be in the format TASK-NNN (e.g., TASK-001)",
                raw
            )))
        }
    }

    /// Extract the identifier from a task title, if the title is canonical.
    pub fn from_title(title: &str) -> Option<Self> {
        TITLE_ID_REGEX
            .captures(title.trim())
            .map(|caps| Self(format!("TASK-{}", &caps[1])))
    }

    /// The numeric suffix.
    pub fn number(&self) -> u32 {
        self.0
            .strip_prefix("TASK-")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl TryFrom<String> for TaskId {
    type Error = RalphError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Whether a title belongs to a task this tool is allowed to manage.
///
/// Literal `TASK-`, exactly three digits, then `:`. Surrounding whitespace
/// is trimmed; nothing else is tolerated.
pub fn is_ralph_task(title: &str) -> bool {
    TITLE_ID_REGEX.is_match(title.trim())
}

/// Every canonical identifier mentioned in `text`, in order of appearance.
pub fn find_ids(text: &str) -> Vec<TaskId> {
    EMBEDDED_ID_REGEX
        .find_iter(text)
        .map(|m| TaskId(m.as_str().to_string()))
        .collect()
}
