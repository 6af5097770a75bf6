//! Test harness utilities for the agent suites.

mod env;
mod host;
mod journal;
mod reporter;
mod transport;
mod world;

pub use env::CleanEnvironment;
pub use journal::{Entry, Journal, wait_until};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use transport::{ConnectBehaviour, RecordingTransportFactory};
pub use world::{AgentHarness, HarnessOptions, SERVER, SESSION};
