//! Agent lifecycle: state machine, initialisation barrier and controller.

mod barrier;
mod controller;
mod errors;
mod state;

pub use self::barrier::InitBarrier;
pub use self::controller::{ControllerDeps, LifecycleController, WORKER_COUNT, WORKER_PREFIX};
pub use self::errors::{BarrierError, ControllerError, StartupError, TransitionError};
pub use self::state::LifecycleState;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");
