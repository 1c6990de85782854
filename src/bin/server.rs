//! Chat state server binary.
//! Run with: cargo run --bin chatroom-server

use std::process::ExitCode;

use chatroom_core::startup;

fn main() -> ExitCode {
    startup::run()
}
