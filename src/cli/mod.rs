// Command-line interface

pub mod commands;
pub mod repl;

pub use commands::Command;
pub use repl::{Repl, SessionSummary};
