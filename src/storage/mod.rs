//! Storage Module
//!
//! Defines the contracts the indexing and search subsystems need from the relational store,
//! and ships two implementations of them.
//!
//! ## Core Concepts
//! - **Reverse index table**: `reverse_index(key TEXT PRIMARY KEY, ids TEXT[])`. Writers need an
//!   append-on-conflict upsert, array element removal and delete-when-empty.
//! - **Employee table**: read-only from this crate's point of view; searches fetch summaries,
//!   edits and deletes fetch the current field values.
//! - **Concurrency**: the store's own concurrency control is relied upon. Nothing in this
//!   crate locks around key/id-set updates.
//!
//! ## Submodules
//! - **`memory`**: `DashMap`-backed stores used by tests and the standalone binary.
//! - **`postgres`**: `sqlx` stores for a PostgreSQL database with `pg_trgm` (feature `postgres`).

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::employees::types::{EmployeeField, EmployeeId, EmployeeSummary};
use crate::error::StoreError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A row of the reverse index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReverseIndexEntry {
    pub key: String,
    pub ids: Vec<EmployeeId>,
}

/// A reverse index row matched by a query token, with its trigram similarity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub key: String,
    pub ids: Vec<EmployeeId>,
    pub score: f64,
}

#[async_trait]
pub trait ReverseIndexStore: Send + Sync {
    /// Appends `id` to the id set of every key, creating missing rows. One batch, one round trip.
    async fn append(&self, id: &str, keys: &[String]) -> Result<(), StoreError>;

    /// Removes every occurrence of `id` from the given keys and deletes rows left empty.
    async fn remove(&self, id: &str, keys: &[String]) -> Result<(), StoreError>;

    async fn lookup(&self, key: &str) -> Result<Option<Vec<EmployeeId>>, StoreError>;

    /// Rows whose key has similarity strictly above `threshold` to any of the tokens.
    /// A row matched by several tokens is returned once per token.
    async fn similar(&self, tokens: &[String], threshold: f64)
    -> Result<Vec<ScoredEntry>, StoreError>;

    /// Rows whose key starts with `prefix`, ordered by key.
    async fn prefixed(&self, prefix: &str) -> Result<Vec<ReverseIndexEntry>, StoreError>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Summaries for the given ids, in the order given. Unknown ids are skipped.
    async fn fetch_summaries(&self, ids: &[EmployeeId]) -> Result<Vec<EmployeeSummary>, StoreError>;

    /// Current non-null values of `fields` for one employee, or `None` if it doesn't exist.
    async fn fetch_values(
        &self,
        id: &str,
        fields: &[EmployeeField],
    ) -> Result<Option<Vec<String>>, StoreError>;
}
