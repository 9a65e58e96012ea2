//! Dependency extraction strategies.
//!
//! The default reads dependencies out of free-text descriptions: any token
//! that looks like a canonical ID counts as a dependency. This over-matches
//! on purpose (a description that merely mentions `TASK-004` depends on it),
//! and trackers that carry a structured dependency list can opt into
//! `Structured` instead.

use crate::task::{Task, TaskId, find_ids};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where dependency edges are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DependencySource {
    /// Every canonical ID mentioned anywhere in the description.
    #[default]
    Text,
    /// The tracker's explicit dependency list, falling back to text when
    /// the tracker sent none.
    Structured,
}

impl DependencySource {
    /// Parse a dependency source from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "structured" => Some(Self::Structured),
            _ => None,
        }
    }

    /// Dependencies declared by `task`, self-references included.
    pub fn extract(self, task: &Task) -> BTreeSet<TaskId> {
        match (self, &task.dependencies) {
            (DependencySource::Structured, Some(list)) => list
                .iter()
                .filter_map(|raw| match TaskId::parse(raw.trim()) {
                    Ok(id) => Some(id),
                    Err(_) => {
                        tracing::debug!(
                            task = %task.title,
                            entry = %raw,
                            "ignoring non-canonical dependency entry"
                        );
                        None
                    }
                })
                .collect(),
            _ => extract_from_text(&task.description),
        }
    }
}

/// Canonical IDs found in `description`, deduplicated.
pub fn extract_from_text(description: &str) -> BTreeSet<TaskId> {
    find_ids(description).into_iter().collect()
}
