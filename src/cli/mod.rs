//! CLI module
//!
//! Command-line interface over [`ParseClient`](crate::client::ParseClient).
//!
//! # Commands
//!
//! - `scan` - Stream every object of a class
//! - `query` - Run a single query
//! - `get` / `create` / `update` / `delete` - Single-object operations
//! - `count` - Count matching objects

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
