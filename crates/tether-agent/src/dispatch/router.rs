//! Barrier-gated routing of commands to handlers.
//!
//! Every command waits for the initialisation barrier before the registry is
//! consulted. Unknown command types are dropped; they never fail the agent.

use std::sync::Arc;

use tracing::debug;

use crate::lifecycle::InitBarrier;

use super::{Command, DispatchError, SharedRegistry};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Outcome of routing one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// A handler ran to completion.
    Handled,
    /// No handler is registered for the command type.
    Unmatched,
}

/// Routes commands once the barrier opens.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    barrier: Arc<InitBarrier>,
    registry: Arc<SharedRegistry>,
}

impl CommandRouter {
    /// Builds a router over the given barrier and registry.
    #[must_use]
    pub fn new(barrier: Arc<InitBarrier>, registry: Arc<SharedRegistry>) -> Self {
        Self { barrier, registry }
    }

    /// Waits for the barrier, then dispatches `command` to its handler.
    pub fn route(&self, command: &Command) -> Result<Routed, DispatchError> {
        self.barrier.wait()?;
        let Some(handler) = self.registry.lookup(command.kind()) else {
            debug!(
                target: DISPATCH_TARGET,
                command = command.kind(),
                correlation_id = command.correlation_id(),
                "no handler registered; dropping command"
            );
            return Ok(Routed::Unmatched);
        };
        debug!(
            target: DISPATCH_TARGET,
            command = command.kind(),
            correlation_id = command.correlation_id(),
            "dispatching command"
        );
        handler
            .handle(command.payload(), command.correlation_id())
            .map_err(|source| DispatchError::Handler {
                command_type: command.kind().to_owned(),
                source,
            })?;
        Ok(Routed::Handled)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::dispatch::{CommandHandler, CommandType, HandlerError, HandlerRegistry};
    use crate::host::HostError;
    use crate::lifecycle::BarrierError;

    #[derive(Default)]
    struct Capture {
        seen: Mutex<Vec<(String, i64)>>,
    }

    impl CommandHandler for Capture {
        fn handle(&self, payload: &str, correlation_id: i64) -> Result<(), HandlerError> {
            self.seen
                .lock()
                .expect("seen lock")
                .push((payload.to_owned(), correlation_id));
            Ok(())
        }
    }

    struct Failing;

    impl CommandHandler for Failing {
        fn handle(&self, _payload: &str, _correlation_id: i64) -> Result<(), HandlerError> {
            Err(HandlerError::Host(HostError::new("boom")))
        }
    }

    struct Fixture {
        router: CommandRouter,
        barrier: Arc<InitBarrier>,
        capture: Arc<Capture>,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let barrier = Arc::new(InitBarrier::new());
        let shared = Arc::new(SharedRegistry::default());
        let capture = Arc::new(Capture::default());
        let mut registry = HandlerRegistry::new();
        registry.register(CommandType::CurrentStatus, capture.clone());
        registry.register(CommandType::Invoke, Arc::new(Failing));
        shared.install(registry);
        Fixture {
            router: CommandRouter::new(Arc::clone(&barrier), shared),
            barrier,
            capture,
        }
    }

    #[rstest]
    fn waits_for_release_before_dispatching(fixture: Fixture) {
        let router = fixture.router.clone();
        let worker = thread::spawn(move || router.route(&Command::new("currentStatus", "{}", 7)));
        thread::sleep(Duration::from_millis(30));
        assert!(fixture.capture.seen.lock().expect("seen lock").is_empty());

        fixture.barrier.release();
        let routed = worker.join().expect("worker").expect("routed");
        assert_eq!(routed, Routed::Handled);
        assert_eq!(
            *fixture.capture.seen.lock().expect("seen lock"),
            vec![("{}".to_owned(), 7)]
        );
    }

    #[rstest]
    fn drops_unknown_commands(fixture: Fixture) {
        fixture.barrier.release();
        let routed = fixture
            .router
            .route(&Command::new("bogus", "", 1))
            .expect("unmatched is not an error");
        assert_eq!(routed, Routed::Unmatched);
    }

    #[rstest]
    fn abandoned_barrier_skips_the_handler(fixture: Fixture) {
        fixture.barrier.abandon();
        let error = fixture
            .router
            .route(&Command::new("currentStatus", "", 2))
            .expect_err("abandoned");
        assert!(matches!(error, DispatchError::Barrier(BarrierError::Abandoned)));
        assert!(fixture.capture.seen.lock().expect("seen lock").is_empty());
    }

    #[rstest]
    fn surfaces_handler_failures(fixture: Fixture) {
        fixture.barrier.release();
        let error = fixture
            .router
            .route(&Command::new("invoke", "", 3))
            .expect_err("handler fails");
        assert!(matches!(
            error,
            DispatchError::Handler { ref command_type, .. } if command_type == "invoke"
        ));
    }
}
