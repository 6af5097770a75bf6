//! Serialised access to the `TETHER_*` process environment.

use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Holds the environment lock with every `TETHER_*` variable removed.
///
/// The removed values are restored on drop.
pub struct CleanEnvironment {
    removed: Vec<(OsString, OsString)>,
    _guard: MutexGuard<'static, ()>,
}

impl CleanEnvironment {
    pub fn acquire() -> Self {
        let guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        let removed: Vec<(OsString, OsString)> = std::env::vars_os()
            .filter(|(key, _)| key.to_string_lossy().starts_with("TETHER_"))
            .collect();
        for (key, _) in &removed {
            // Edition 2024 marks environment mutation unsafe; the mutex
            // serialises every test that touches it.
            unsafe { std::env::remove_var(key) };
        }
        Self {
            removed,
            _guard: guard,
        }
    }
}

impl Drop for CleanEnvironment {
    fn drop(&mut self) {
        for (key, value) in self.removed.drain(..) {
            unsafe { std::env::set_var(key, value) };
        }
    }
}
