//! The archive store: one timestamped JSON file per cleanup batch.
//!
//! Files are written atomically and never overwritten; a second batch in the
//! same second gets a numeric suffix (`archive-20260113T100000Z-2.json`).

use crate::error::{RalphError, Result};
use crate::fs::atomic_write_file;
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full snapshots of the tasks retired in one cleanup pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveBatch {
    pub archived_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub tasks: Vec<Task>,
}

impl ArchiveBatch {
    /// `archive-YYYYMMDDTHHMMSSZ`.
    pub fn file_stem(&self) -> String {
        format!("archive-{}", self.archived_at.format("%Y%m%dT%H%M%SZ"))
    }

    /// Write the batch into `dir` and return the file written.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            RalphError::UserError(format!("failed to serialize archive batch: {}", e))
        })?;
        let path = unique_path(dir, &self.file_stem());
        atomic_write_file(&path, &format!("{}\n", json))?;
        Ok(path)
    }
}

fn unique_path(dir: &Path, stem: &str) -> PathBuf {
    let first = dir.join(format!("{}.json", stem));
    if !first.exists() {
        return first;
    }
    (2..)
        .map(|n| dir.join(format!("{}-{}.json", stem, n)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}
