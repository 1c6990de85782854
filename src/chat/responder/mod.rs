//! Simulated assistant: canned replies delivered after a random delay.

pub mod corpus;
pub mod scheduler;

pub use corpus::{REPLY_CORPUS, pick_reply};
pub use scheduler::ResponseScheduler;
