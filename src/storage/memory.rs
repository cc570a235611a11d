//! In-memory stores.
//!
//! `MemoryReverseIndex` mirrors the array semantics of the relational table: appends never
//! check membership, removal drops every occurrence, and an emptied row disappears.

use super::{EmployeeStore, ReverseIndexEntry, ReverseIndexStore, ScoredEntry};
use crate::employees::types::{
    Employee, EmployeeField, EmployeeId, EmployeePatch, EmployeeSummary,
};
use crate::error::StoreError;
use crate::search::trigram;

use async_trait::async_trait;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryReverseIndex {
    entries: DashMap<String, Vec<EmployeeId>>,
}

impl MemoryReverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Raw id array of a row, duplicates included.
    pub fn raw_ids(&self, key: &str) -> Option<Vec<EmployeeId>> {
        self.entries.get(key).map(|ids| ids.value().clone())
    }
}

#[async_trait]
impl ReverseIndexStore for MemoryReverseIndex {
    async fn append(&self, id: &str, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            self.entries
                .entry(key.clone())
                .or_default()
                .push(id.to_string());
        }
        tracing::trace!("Appended {} to {} keys", id, keys.len());
        Ok(())
    }

    async fn remove(&self, id: &str, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            if let Some(mut ids) = self.entries.get_mut(key) {
                ids.retain(|existing| existing != id);
            }
            // The guard above must be released before touching the shard again.
            self.entries.remove_if(key, |_, ids| ids.is_empty());
        }
        tracing::trace!("Removed {} from {} keys", id, keys.len());
        Ok(())
    }

    async fn lookup(&self, key: &str) -> Result<Option<Vec<EmployeeId>>, StoreError> {
        Ok(self.raw_ids(key))
    }

    async fn similar(
        &self,
        tokens: &[String],
        threshold: f64,
    ) -> Result<Vec<ScoredEntry>, StoreError> {
        let mut matches = Vec::new();
        for entry in self.entries.iter() {
            for token in tokens {
                let score = trigram::similarity(token, entry.key());
                if score > threshold {
                    matches.push(ScoredEntry {
                        key: entry.key().clone(),
                        ids: entry.value().clone(),
                        score,
                    });
                }
            }
        }
        Ok(matches)
    }

    async fn prefixed(&self, prefix: &str) -> Result<Vec<ReverseIndexEntry>, StoreError> {
        let mut rows: Vec<ReverseIndexEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| ReverseIndexEntry {
                key: entry.key().clone(),
                ids: entry.value().clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(rows)
    }
}

/// Stand-in for the primary employee table. The write methods exist for the CRUD side and
/// for seeding; the indexer itself only reads.
#[derive(Default)]
pub struct MemoryEmployees {
    records: DashMap<EmployeeId, Employee>,
}

impl MemoryEmployees {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, employee: Employee) {
        self.records.insert(employee.id.clone(), employee);
    }

    pub fn remove(&self, id: &str) -> Option<Employee> {
        self.records.remove(id).map(|(_, employee)| employee)
    }

    pub fn update(&self, id: &str, patch: &EmployeePatch) -> Result<(), StoreError> {
        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(record.value_mut());
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployees {
    async fn fetch_summaries(&self, ids: &[EmployeeId]) -> Result<Vec<EmployeeSummary>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).map(|record| record.summary()))
            .collect())
    }

    async fn fetch_values(
        &self,
        id: &str,
        fields: &[EmployeeField],
    ) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.records.get(id).map(|record| record.values_of(fields)))
    }
}
