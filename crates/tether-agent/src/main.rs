use std::process::ExitCode;

use tether_agent::{AgentOutcome, LaunchError, run_agent};

fn main() -> ExitCode {
    match run_agent() {
        Ok(AgentOutcome::Inert | AgentOutcome::Stopped) => ExitCode::SUCCESS,
        Ok(AgentOutcome::JoinTimedOut) => ExitCode::FAILURE,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "telemetry may not be installed when launch fails"
)]
fn report(error: &LaunchError) {
    eprintln!("tether-agent: {error}");
}
