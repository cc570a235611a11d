//! Indexing Queue
//!
//! A mutex-guarded FIFO of handles to indexing tasks running on the tokio runtime.
//!
//! ## Responsibilities
//! - **Dispatch**: `submit` spawns the task and returns at once; the caller never waits for
//!   the index.
//! - **Housekeeping**: finished tasks at the front are dropped on every submit. This is not
//!   a concurrency bound; tasks finishing out of order stay tracked until they reach the front.
//! - **Failure reporting**: a failed task is logged and counted. Nothing is reported back to
//!   the request that produced it.

use super::types::{IndexTask, QueueStats, TaskId};
use crate::index::mutator::IndexMutator;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct TrackedTask {
    id: TaskId,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Counters {
    in_flight: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    idle: Notify,
}

/// Counts one spawned task as in flight until dropped. A guard dropped without `settle`
/// (the task panicked or its runtime dropped it unpolled) counts as failed.
struct InFlight {
    counters: Arc<Counters>,
    settled: bool,
}

impl InFlight {
    fn new(counters: Arc<Counters>) -> Self {
        counters.in_flight.fetch_add(1, Ordering::AcqRel);
        Self {
            counters,
            settled: false,
        }
    }

    fn settle(mut self, succeeded: bool) {
        let counter = if succeeded {
            &self.counters.completed
        } else {
            &self.counters.failed
        };
        counter.fetch_add(1, Ordering::AcqRel);
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.counters.failed.fetch_add(1, Ordering::AcqRel);
        }
        if self.counters.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.counters.idle.notify_waiters();
        }
    }
}

pub struct IndexQueue {
    tasks: Mutex<VecDeque<TrackedTask>>,
    mutator: Arc<IndexMutator>,
    runtime: Handle,
    counters: Arc<Counters>,
}

impl IndexQueue {
    /// Creates a queue dispatching onto `runtime`.
    pub fn new(mutator: Arc<IndexMutator>, runtime: Handle) -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            mutator,
            runtime,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Creates a queue on the runtime of the calling context.
    ///
    /// # Panics
    /// When called outside a tokio runtime.
    pub fn on_current_runtime(mutator: Arc<IndexMutator>) -> Self {
        Self::new(mutator, Handle::current())
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<TrackedTask>> {
        // No critical section can leave the deque inconsistent, so poisoning is ignored.
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawns `task` and tracks its handle. Returns without waiting for it.
    pub fn submit(&self, task: IndexTask) -> TaskId {
        let task_id = TaskId::new();
        let mut tasks = self.lock();

        while tasks.front().is_some_and(|front| front.handle.is_finished()) {
            if let Some(done) = tasks.pop_front() {
                tracing::trace!("Collected finished index task {}", done.id);
            }
        }

        tracing::debug!(
            "Submitting index task {} ({} for {})",
            task_id,
            task.kind(),
            task.employee_id()
        );

        let mutator = self.mutator.clone();
        let guard = InFlight::new(self.counters.clone());
        let id = task_id.clone();
        let handle = self.runtime.spawn(async move {
            match mutator.apply(&task).await {
                Ok(()) => {
                    guard.settle(true);
                    tracing::debug!("Index task {} completed", id);
                }
                Err(e) => {
                    guard.settle(false);
                    tracing::error!(
                        "Index task {} ({} for {}) failed: {}",
                        id,
                        task.kind(),
                        task.employee_id(),
                        e
                    );
                }
            }
        });

        tasks.push_back(TrackedTask {
            id: task_id.clone(),
            handle,
        });

        task_id
    }

    /// Forgets every tracked task, finished or not. Running tasks keep running.
    /// Returns how many entries were dropped.
    pub fn drain_all(&self) -> usize {
        let mut tasks = self.lock();
        let drained = tasks.len();
        tasks.clear();
        tracing::info!("Drained {} index tasks from the queue", drained);
        drained
    }

    /// Number of handles currently held.
    pub fn tracked(&self) -> usize {
        self.lock().len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            tracked: self.tracked(),
            in_flight: self.counters.in_flight.load(Ordering::Acquire),
            completed: self.counters.completed.load(Ordering::Acquire),
            failed: self.counters.failed.load(Ordering::Acquire),
        }
    }

    /// Waits until no spawned task is running, including tasks forgotten by `drain_all`.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.counters.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.counters.in_flight.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}
