//! Fixed-size worker pool draining a FIFO queue.
//!
//! Every unit of agent work (startup, teardown, each inbound command) runs as
//! a job on this pool. Shutdown is orderly: submissions are rejected, queued
//! jobs still run, then the workers exit.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error};

const POOL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pool");

type Job = Box<dyn FnOnce() + Send + 'static>;

thread_local! {
    static IN_WORK_ITEM: Cell<bool> = const { Cell::new(false) };
}

/// Whether the calling thread is running a pool job.
///
/// Panics raised inside a job are caught and logged by the worker, so the
/// process survives them.
pub(crate) fn in_work_item() -> bool {
    IN_WORK_ITEM.with(Cell::get)
}

/// Errors raised by [`WorkerPool`].
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool no longer accepts work.
    #[error("worker pool is shut down")]
    Rejected,
    /// A worker thread could not be started.
    #[error("failed to spawn worker '{name}': {source}")]
    Spawn {
        /// Thread name.
        name: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

struct PoolState {
    queue: VecDeque<Job>,
    accepting: bool,
    live_workers: usize,
}

struct Inner {
    state: Mutex<PoolState>,
    available: Condvar,
    drained: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pool of named worker threads.
pub struct WorkerPool {
    inner: Arc<Inner>,
}

impl WorkerPool {
    /// Spawns `size` workers named `{prefix}0`, `{prefix}1`, and so on.
    pub fn new(prefix: &str, size: usize) -> Result<Self, PoolError> {
        let inner = Arc::new(Inner {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                accepting: true,
                live_workers: 0,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        });
        let pool = Self { inner };
        for index in 0..size {
            let name = format!("{prefix}{index}");
            let worker = Arc::clone(&pool.inner);
            pool.inner.lock().live_workers += 1;
            if let Err(source) = thread::Builder::new()
                .name(name.clone())
                .spawn(move || run_worker(&worker))
            {
                pool.inner.lock().live_workers -= 1;
                pool.shutdown();
                return Err(PoolError::Spawn { name, source });
            }
        }
        Ok(pool)
    }

    /// Queues `job` behind any work already submitted.
    pub fn execute<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.lock();
        if !state.accepting {
            return Err(PoolError::Rejected);
        }
        state.queue.push_back(Box::new(job));
        drop(state);
        self.inner.available.notify_one();
        Ok(())
    }

    /// Stops accepting work. Queued jobs still run.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        if state.accepting {
            state.accepting = false;
            debug!(
                target: POOL_TARGET,
                queued = state.queue.len(),
                "worker pool shutting down"
            );
        }
        drop(state);
        self.inner.available.notify_all();
        self.inner.drained.notify_all();
    }

    /// Blocks until the pool is shut down, drained and every worker has
    /// exited, or `timeout` elapses. Returns `true` on termination.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.inner.lock();
        loop {
            if !state.accepting && state.queue.is_empty() && state.live_workers == 0 {
                return true;
            }
            let remaining = match deadline {
                Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                    Some(remaining) if !remaining.is_zero() => remaining,
                    _ => return false,
                },
                None => timeout,
            };
            state = self
                .inner
                .drained
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(inner: &Inner) {
    loop {
        let job = {
            let mut state = inner.lock();
            loop {
                if let Some(job) = state.queue.pop_front() {
                    break Some(job);
                }
                if !state.accepting {
                    break None;
                }
                state = inner
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };
        let Some(job) = job else {
            break;
        };
        IN_WORK_ITEM.with(|flag| flag.set(true));
        let outcome = panic::catch_unwind(AssertUnwindSafe(job));
        IN_WORK_ITEM.with(|flag| flag.set(false));
        if outcome.is_err() {
            error!(
                target: POOL_TARGET,
                worker = thread::current().name().unwrap_or("unnamed"),
                "work item panicked"
            );
        }
    }
    let mut state = inner.lock();
    state.live_workers = state.live_workers.saturating_sub(1);
    drop(state);
    inner.drained.notify_all();
}
