//! snappy CLI library.
//!
//! Argument parsing, command execution and output formatting for the
//! `snappy` binary. Commands take the store and the current instant as
//! parameters so they can run against an in-memory store.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
