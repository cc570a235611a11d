//! Index Mutator
//!
//! Turns an employee mutation into key/id deltas against the reverse index.
//! Each operation is idempotent in intent only: a repeated add appends the id again,
//! which delete later cleans up in one pass.

use super::normalizer::keys_for;
use crate::employees::types::EmployeeField;
use crate::error::IndexError;
use crate::executor::types::IndexTask;
use crate::storage::{EmployeeStore, ReverseIndexStore};

use std::sync::Arc;

pub struct IndexMutator {
    index: Arc<dyn ReverseIndexStore>,
    employees: Arc<dyn EmployeeStore>,
}

impl IndexMutator {
    pub fn new(index: Arc<dyn ReverseIndexStore>, employees: Arc<dyn EmployeeStore>) -> Self {
        Self { index, employees }
    }

    /// Runs one queued task to completion.
    pub async fn apply(&self, task: &IndexTask) -> Result<(), IndexError> {
        match task {
            IndexTask::Add { id, values } => self.add_entry(id, values).await,
            IndexTask::Delete { id, values } => self.delete_entry(id, values).await,
            IndexTask::Edit {
                id,
                changed,
                values,
            } => self.edit_entry(id, changed, values).await,
        }
    }

    /// Appends `id` under the key of every value, as a single batched upsert.
    pub async fn add_entry(&self, id: &str, values: &[String]) -> Result<(), IndexError> {
        let keys = keys_for(values);
        if keys.is_empty() {
            return Ok(());
        }

        self.index.append(id, &keys).await?;
        tracing::debug!("Indexed {} under {} keys", id, keys.len());
        Ok(())
    }

    /// Removes `id` from the keys of the previously stored values; emptied rows are dropped.
    pub async fn delete_entry(&self, id: &str, values: &[String]) -> Result<(), IndexError> {
        let keys = keys_for(values);
        if keys.is_empty() {
            return Ok(());
        }

        self.index.remove(id, &keys).await?;
        tracing::debug!("Unindexed {} from {} keys", id, keys.len());
        Ok(())
    }

    /// Reads the current values of `changed`, unindexes them, then indexes `values`.
    ///
    /// Must run before the employee row is updated: the old values come from the store.
    pub async fn edit_entry(
        &self,
        id: &str,
        changed: &[EmployeeField],
        values: &[String],
    ) -> Result<(), IndexError> {
        let old_values = self
            .employees
            .fetch_values(id, changed)
            .await?
            .ok_or_else(|| IndexError::EmployeeNotFound(id.to_string()))?;

        self.delete_entry(id, &old_values).await?;
        self.add_entry(id, values).await
    }
}
