//! Binary entrypoint that serves the chat state API.

use std::process::ExitCode;

use chatroom_core::startup;

fn main() -> ExitCode {
    startup::run()
}
