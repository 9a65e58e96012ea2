//! Bounded start of ready tasks.
//!
//! At most `max_parallel` start attempts are made per pass. A failed start
//! is recorded and the next task is still attempted; the failed task stays
//! `todo` and is retried on a later pass. Tasks beyond the bound are left
//! untouched.

use crate::error::Result;
use crate::readiness::Readiness;
use crate::snapshot::Snapshot;
use crate::task::{Task, TaskId};

/// A task whose workspace session started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedTask {
    pub id: TaskId,
    pub session_id: String,
}

/// Result of one scheduling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulingReport {
    pub started: Vec<StartedTask>,
    /// Start attempts that failed, with the error message.
    pub failed: Vec<(TaskId, String)>,
    /// Ready tasks not attempted because the bound was reached.
    pub deferred: Vec<TaskId>,
    pub skipped_not_ralph: usize,
    pub skipped_blocked: usize,
}

impl SchedulingReport {
    pub fn started_ids(&self) -> Vec<&TaskId> {
        self.started.iter().map(|s| &s.id).collect()
    }
}

/// Start up to `max_parallel` ready tasks through `start_fn`.
///
/// `start_fn` receives the task record from `snapshot` and returns the new
/// session ID. Any error it returns is recorded against that task only.
pub fn schedule<F>(
    snapshot: &Snapshot,
    readiness: &Readiness,
    max_parallel: usize,
    mut start_fn: F,
) -> SchedulingReport
where
    F: FnMut(&TaskId, &Task) -> Result<String>,
{
    let mut report = SchedulingReport {
        skipped_not_ralph: readiness.skipped_not_ralph,
        skipped_blocked: readiness.blocked.len(),
        ..Default::default()
    };

    let split = readiness.ready.len().min(max_parallel);
    let (batch, rest) = readiness.ready.split_at(split);
    report.deferred = rest.to_vec();

    for id in batch {
        let Some(task) = snapshot.get(id) else {
            report
                .failed
                .push((id.clone(), "task missing from snapshot".to_string()));
            continue;
        };

        match start_fn(id, task) {
            Ok(session_id) => {
                tracing::info!(task = %id, session = %session_id, "started workspace session");
                report.started.push(StartedTask {
                    id: id.clone(),
                    session_id,
                });
            }
            Err(e) => {
                tracing::warn!(task = %id, error = %e, "failed to start workspace session");
                report.failed.push((id.clone(), e.to_string()));
            }
        }
    }

    report
}
