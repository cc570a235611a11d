//! Employee Records
//!
//! The employee model as seen by the indexing subsystem. Records are owned by the CRUD
//! layer; the indexer only reads the values it is handed or fetches through `EmployeeStore`.
//!
//! ## Submodules
//! - **`types`**: `Employee`, the indexable `EmployeeField` set, the `EmployeePatch` used by
//!   profile edits and the `EmployeeSummary` returned by searches.

pub mod types;
