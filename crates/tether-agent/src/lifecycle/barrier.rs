//! One-shot gate holding command work until startup completes.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::errors::BarrierError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Pending,
    Released,
    Abandoned,
}

/// Initialisation barrier.
///
/// Starts pending; moves to released or abandoned exactly once. Waiters block
/// on a condition variable until the gate leaves the pending state.
#[derive(Debug)]
pub struct InitBarrier {
    gate: Mutex<Gate>,
    changed: Condvar,
}

impl Default for InitBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl InitBarrier {
    /// Builds a pending barrier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gate: Mutex::new(Gate::Pending),
            changed: Condvar::new(),
        }
    }

    /// Opens the gate. Returns `true` only for the call that released it.
    pub fn release(&self) -> bool {
        self.settle(Gate::Released)
    }

    /// Fails every current and future waiter. Has no effect once released.
    pub fn abandon(&self) -> bool {
        self.settle(Gate::Abandoned)
    }

    /// Blocks until the gate is released or abandoned.
    pub fn wait(&self) -> Result<(), BarrierError> {
        let gate = self.lock()?;
        let gate = self
            .changed
            .wait_while(gate, |gate| *gate == Gate::Pending)
            .map_err(|_| BarrierError::Poisoned)?;
        match *gate {
            Gate::Released => Ok(()),
            Gate::Pending | Gate::Abandoned => Err(BarrierError::Abandoned),
        }
    }

    fn settle(&self, next: Gate) -> bool {
        let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if *gate != Gate::Pending {
            return false;
        }
        *gate = next;
        drop(gate);
        self.changed.notify_all();
        true
    }

    fn lock(&self) -> Result<MutexGuard<'_, Gate>, BarrierError> {
        self.gate.lock().map_err(|_| BarrierError::Poisoned)
    }
}
