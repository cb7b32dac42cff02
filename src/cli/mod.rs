//! CLI module for the Hyperbolic client.
//!
//! This module provides the command-line interface for listing,
//! inspecting and terminating marketplace instances, browsing
//! availability, and renting.

mod commands;
mod output;

pub use commands::{Cli, Commands, NetworkArg, OutputFormat, RentCommands, RentalKind};
pub use output::OutputFormatter;
