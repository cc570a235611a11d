//! Search Service Module
//!
//! Answers employee searches from the reverse index.
//!
//! ## Search Modes
//! - **Exact**: the whole query, normalized, is a single key.
//! - **Ranked**: every query token is compared with every key by trigram similarity; keys
//!   above the threshold add their score to each of their ids, and the heaviest ids win.
//! - **Suggest**: leading tokens are exact filters, the last token is a key prefix; the id sets
//!   are intersected and capped at a handful of results.
//!
//! ## Submodules
//! - **`engine`**: The three algorithms and their pure ranking/intersection helpers.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`trigram`**: `pg_trgm`-compatible trigram similarity used by in-memory stores.
//! - **`types`**: Data Transfer Objects (DTOs) for API communication.

pub mod engine;
pub mod handlers;
pub mod trigram;
pub mod types;

#[cfg(test)]
mod tests;
