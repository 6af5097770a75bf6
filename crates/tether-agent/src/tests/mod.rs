//! Controller-level test suites for the agent.

mod support;
