//! Employee Reverse Index & Search Library
//!
//! This library crate keeps a secondary reverse index over the employee store and answers
//! text searches against it. It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! - **`index`**: Normalization of free text into index keys and the mutator that turns
//!   employee mutations into key/id deltas.
//! - **`executor`**: The in-process indexing queue. Indexing runs in the background so the
//!   request that mutated an employee never waits for the index.
//! - **`search`**: Exact, ranked (trigram) and suggest search, plus their HTTP handlers.
//! - **`storage`**: Store traits for the reverse index and the employee records, with an
//!   in-memory implementation and an optional PostgreSQL one (`postgres` feature).
//! - **`employees`**: The employee record model as seen by the indexer.

pub mod config;
pub mod employees;
pub mod error;
pub mod executor;
pub mod index;
pub mod search;
pub mod storage;
