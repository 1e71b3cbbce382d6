//! Command-line front end for running and probing mesh nodes.
//!
//! Provides commands for:
//! - Serving a node and joining an existing mesh
//! - Pinging a peer
//! - Measuring round-trip time to a peer

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
