//! Panic-hook crash reporting.

use std::fmt;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;
use tracing::{debug, error};

use crate::pool;
use crate::transport::{OutboundMessage, Transport, kinds};

use super::CrashHandler;

/// Correlation id of crash reports.
pub const CRASH_CORRELATION_ID: i64 = -10_000;

const CRASH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

type Attached = Mutex<Option<Arc<dyn Transport>>>;
type TransportSlot = Arc<Attached>;

/// Builds the crash report sent for `details`.
#[must_use]
pub fn crash_report(details: &str) -> OutboundMessage {
    OutboundMessage::new(
        kinds::APP_WILL_TERMINATE_WITH_ERROR,
        json!({ "errorDetails": details }),
        CRASH_CORRELATION_ID,
    )
}

/// Reports panics to the orchestration server before the previous hook runs.
///
/// The hook is process-wide, installed on the first attach and never
/// removed. It reports through whichever transport is currently attached, so
/// a detached handler leaves the hook silent. Panics inside agent work items
/// are skipped because the worker pool recovers from them.
#[derive(Default)]
pub struct PanicCrashHandler {
    slot: TransportSlot,
    hooked: AtomicBool,
}

impl fmt::Debug for PanicCrashHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanicCrashHandler")
            .field("attached", &lock(&self.slot).is_some())
            .field("hooked", &self.hooked.load(Ordering::SeqCst))
            .finish()
    }
}

impl CrashHandler for PanicCrashHandler {
    fn attach(&self, transport: Arc<dyn Transport>) {
        *lock(&self.slot) = Some(transport);
        if self.hooked.swap(true, Ordering::SeqCst) {
            return;
        }
        let slot = Arc::clone(&self.slot);
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            report_panic(&slot, &info.to_string());
            previous(info);
        }));
    }

    fn detach(&self) {
        if lock(&self.slot).take().is_some() {
            debug!(target: CRASH_TARGET, "crash handler detached");
        }
    }
}

fn lock(slot: &Attached) -> MutexGuard<'_, Option<Arc<dyn Transport>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sends a crash report for a fatal panic. Returns whether one was sent.
fn report_panic(slot: &Attached, details: &str) -> bool {
    if pool::in_work_item() {
        debug!(target: CRASH_TARGET, details = %details, "work item panicked");
        return false;
    }
    let Some(transport) = lock(slot).clone() else {
        return false;
    };
    error!(target: CRASH_TARGET, details = %details, "host panicked");
    match transport.send(&crash_report(details)) {
        Ok(()) => true,
        Err(send_error) => {
            error!(
                target: CRASH_TARGET,
                error = %send_error,
                "failed to report crash"
            );
            false
        }
    }
}
