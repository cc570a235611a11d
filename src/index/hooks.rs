//! Indexing entry points for the CRUD layer.
//!
//! Handlers call these after (create) or before (delete, edit) touching the employee table.
//! Every call returns as soon as the task is queued; the index catches up in the background.

use crate::employees::types::{Employee, EmployeeField, EmployeePatch};
use crate::error::IndexError;
use crate::executor::queue::IndexQueue;
use crate::executor::types::{IndexTask, TaskId};
use crate::storage::EmployeeStore;

use std::sync::Arc;

pub struct Indexer {
    queue: Arc<IndexQueue>,
    employees: Arc<dyn EmployeeStore>,
}

impl Indexer {
    pub fn new(queue: Arc<IndexQueue>, employees: Arc<dyn EmployeeStore>) -> Self {
        Self { queue, employees }
    }

    pub fn queue(&self) -> &Arc<IndexQueue> {
        &self.queue
    }

    fn check_id(id: &str) -> Result<(), IndexError> {
        if id.is_empty() {
            tracing::warn!("Invalid arguments for indexation: empty employee id");
            return Err(IndexError::InvalidRequest(
                "employee id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Queues indexing of every indexable value of a freshly created employee.
    /// Returns `Ok(None)` when the employee has nothing to index.
    pub fn on_entity_created(&self, employee: &Employee) -> Result<Option<TaskId>, IndexError> {
        Self::check_id(&employee.id)?;

        let values = employee.indexable_values();
        if values.is_empty() {
            tracing::warn!("Employee {} has no indexable values", employee.id);
            return Ok(None);
        }

        Ok(Some(self.queue.submit(IndexTask::Add {
            id: employee.id.clone(),
            values,
        })))
    }

    /// Reads the employee's current values and queues their removal from the index.
    /// Must be called before the row is deleted.
    pub async fn on_entity_deleted(&self, id: &str) -> Result<TaskId, IndexError> {
        Self::check_id(id)?;

        let values = self
            .employees
            .fetch_values(id, &EmployeeField::ALL)
            .await?
            .ok_or_else(|| IndexError::EmployeeNotFound(id.to_string()))?;

        Ok(self.queue.submit(IndexTask::Delete {
            id: id.to_string(),
            values,
        }))
    }

    /// Queues the replacement of the patched fields' index entries.
    /// Must be called before the patch is written: the task reads the old values itself.
    /// Returns `Ok(None)` for an empty patch.
    pub fn on_entity_edited(
        &self,
        id: &str,
        patch: &EmployeePatch,
    ) -> Result<Option<TaskId>, IndexError> {
        Self::check_id(id)?;

        if patch.is_empty() {
            tracing::warn!("Edit of employee {} changes no indexable field", id);
            return Ok(None);
        }

        Ok(Some(self.queue.submit(IndexTask::Edit {
            id: id.to_string(),
            changed: patch.changed_fields(),
            values: patch.values(),
        })))
    }
}
