//! Reverse Index Module
//!
//! Keeps the reverse index (normalized key → employee ids) in step with the employee table.
//!
//! ## Overview
//! CRUD handlers report mutations through `Indexer`; each report becomes an `IndexTask` on
//! the `IndexQueue`, and the `IndexMutator` applies it to the store in the background.
//! The index is therefore eventually consistent: between a committed mutation and the end of
//! its task, searches see the previous state.
//!
//! ## Submodules
//! - **`normalizer`**: Case folding and tokenization shared with every search mode.
//! - **`mutator`**: Add / delete / edit-diff operations against `ReverseIndexStore`.
//! - **`hooks`**: The collaborator contract used by CRUD handlers.

pub mod hooks;
pub mod mutator;
pub mod normalizer;
