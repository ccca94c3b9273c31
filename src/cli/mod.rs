//! Command-line interface for ultrascrap.
//!
//! This module provides CLI commands for searching the song database,
//! downloading song folders, and inspecting the download ledger.

mod commands;

pub use commands::{Cli, Commands, run_command};
