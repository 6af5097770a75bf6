//! Ordered log shared by the transport and host doubles.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Observable side effects, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Connected { server: String, session: String },
    CrashHandlerAttached,
    HangDetectorAttached,
    CrashHandlerDetached,
    HangDetectorDetached,
    BootstrapCompleted,
    Sent { kind: String, correlation_id: i64 },
    AppReset,
    TransportClosed,
}

impl Entry {
    pub fn sent(kind: &str, correlation_id: i64) -> Self {
        Self::Sent {
            kind: kind.to_owned(),
            correlation_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Journal {
    pub fn record(&self, entry: Entry) {
        self.entries.lock().expect("journal lock").push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().expect("journal lock").clone()
    }

    pub fn position(&self, entry: &Entry) -> Option<usize> {
        self.entries().iter().position(|recorded| recorded == entry)
    }

    pub fn position_where(&self, predicate: impl Fn(&Entry) -> bool) -> Option<usize> {
        self.entries().iter().position(predicate)
    }

    pub fn count(&self, entry: &Entry) -> usize {
        self.entries()
            .iter()
            .filter(|recorded| *recorded == entry)
            .count()
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.position(entry).is_some()
    }

    /// Polls until `entry` is recorded or two seconds pass.
    pub fn wait_for(&self, entry: &Entry) -> bool {
        wait_until(|| self.contains(entry))
    }
}

/// Polls `condition` every 10ms for up to two seconds.
pub fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}
