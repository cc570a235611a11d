use crate::employees::types::{EmployeeField, EmployeeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a submitted indexing task, used to correlate log lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The definition of a unit of indexing work.
///
/// Values are raw field values; the mutator normalizes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum IndexTask {
    /// Index every value under `id`.
    Add {
        id: EmployeeId,
        values: Vec<String>,
    },
    /// Unindex the previously stored values of `id`.
    Delete {
        id: EmployeeId,
        values: Vec<String>,
    },
    /// Replace the index entries of the `changed` fields with `values`.
    /// The old values are read from the employee store when the task runs.
    Edit {
        id: EmployeeId,
        changed: Vec<EmployeeField>,
        values: Vec<String>,
    },
}

impl IndexTask {
    pub fn employee_id(&self) -> &str {
        match self {
            IndexTask::Add { id, .. } | IndexTask::Delete { id, .. } | IndexTask::Edit { id, .. } => {
                id.as_str()
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IndexTask::Add { .. } => "add",
            IndexTask::Delete { .. } => "delete",
            IndexTask::Edit { .. } => "edit",
        }
    }
}

/// Snapshot of queue counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueStats {
    /// Handles still held by the queue (finished ones not yet collected included).
    pub tracked: usize,
    /// Tasks spawned and not yet finished, tracked or not.
    pub in_flight: usize,
    pub completed: usize,
    /// Tasks that returned an error, panicked, or were dropped before running.
    pub failed: usize,
}
