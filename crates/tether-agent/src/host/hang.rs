//! Heartbeat watchdog reporting unresponsive hosts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;
use tracing::{debug, warn};

use crate::transport::{OutboundMessage, Transport, TransportError, kinds};

use super::HangDetector;

/// Correlation id of hang reports.
pub const HANG_CORRELATION_ID: i64 = -10_001;

const HANG_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");
const MIN_POLL: Duration = Duration::from_millis(10);
const MAX_POLL: Duration = Duration::from_millis(250);

/// Builds the hang report sent after a stall of `stalled_for`.
#[must_use]
pub fn hang_report(stalled_for: Duration) -> OutboundMessage {
    let thread_dump = format!(
        "host heartbeat stalled for {} ms",
        stalled_for.as_millis()
    );
    OutboundMessage::new(
        kinds::APP_NONRESPONSIVE_DETECTED,
        json!({ "threadDump": thread_dump }),
        HANG_CORRELATION_ID,
    )
}

/// Liveness signal the host's main loop refreshes.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    last: Arc<Mutex<Instant>>,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}

impl Heartbeat {
    /// Builds a heartbeat that has just beaten.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Records that the host is responsive.
    pub fn beat(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Time since the last beat.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }
}

/// Watches a [`Heartbeat`] from a background thread.
///
/// Sends one report per stall; a fresh beat re-arms it. Each attach starts a
/// watchdog thread that runs until the next attach or detach, or until the
/// transport reports it is closed.
#[derive(Debug)]
pub struct WatchdogHangDetector {
    heartbeat: Heartbeat,
    threshold: Duration,
    running: Mutex<Option<Arc<AtomicBool>>>,
}

impl WatchdogHangDetector {
    /// Builds a detector reporting stalls longer than `threshold`.
    #[must_use]
    pub fn new(heartbeat: Heartbeat, threshold: Duration) -> Self {
        Self {
            heartbeat,
            threshold,
            running: Mutex::new(None),
        }
    }

    fn replace_watch(&self, next: Option<Arc<AtomicBool>>) {
        let previous = std::mem::replace(
            &mut *self.running.lock().unwrap_or_else(PoisonError::into_inner),
            next,
        );
        if let Some(stop) = previous {
            stop.store(true, Ordering::SeqCst);
        }
    }
}

impl HangDetector for WatchdogHangDetector {
    fn attach(&self, transport: Arc<dyn Transport>) {
        let stop = Arc::new(AtomicBool::new(false));
        self.replace_watch(Some(Arc::clone(&stop)));
        let heartbeat = self.heartbeat.clone();
        let threshold = self.threshold;
        let poll = (threshold / 4).clamp(MIN_POLL, MAX_POLL);
        let spawned = thread::Builder::new()
            .name("tether-watchdog".to_owned())
            .spawn(move || watch(&heartbeat, threshold, poll, &stop, transport.as_ref()));
        if let Err(error) = spawned {
            warn!(
                target: HANG_TARGET,
                error = %error,
                "failed to start hang watchdog"
            );
        }
    }

    fn detach(&self) {
        self.replace_watch(None);
    }
}

fn watch(
    heartbeat: &Heartbeat,
    threshold: Duration,
    poll: Duration,
    stop: &AtomicBool,
    transport: &dyn Transport,
) {
    let mut reported = false;
    loop {
        thread::sleep(poll);
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let stalled_for = heartbeat.elapsed();
        if stalled_for < threshold {
            reported = false;
            continue;
        }
        if reported {
            continue;
        }
        reported = true;
        warn!(
            target: HANG_TARGET,
            stalled_ms = stalled_for.as_millis(),
            "host is unresponsive"
        );
        match transport.send(&hang_report(stalled_for)) {
            Ok(()) => {}
            Err(TransportError::Closed) => break,
            Err(error) => warn!(
                target: HANG_TARGET,
                error = %error,
                "failed to report hang"
            ),
        }
    }
    debug!(target: HANG_TARGET, "hang watchdog stopped");
}
