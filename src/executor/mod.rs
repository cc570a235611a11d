//! Background Indexing Executor
//!
//! Runs reverse index updates detached from the requests that caused them.
//!
//! ## Architecture Overview
//! 1. **Submission**: A CRUD handler hands an `IndexTask` to `IndexQueue::submit` and returns.
//! 2. **Execution**: The task is spawned on the tokio runtime and applied by the `IndexMutator`.
//!    Tasks run concurrently; two tasks for one employee may finish in either order.
//! 3. **Housekeeping**: Finished tasks at the head of the queue are dropped on the next submit.
//! 4. **Failure**: Errors are logged and counted. The originating request already succeeded.
//!
//! ## Submodules
//! - **`types`**: `IndexTask`, `TaskId`, `QueueStats`.
//! - **`queue`**: The mutex-guarded queue of task handles.
//! - **`handlers`**: HTTP endpoint for dropping tracked tasks between test scenarios.

pub mod handlers;
pub mod queue;
pub mod types;
