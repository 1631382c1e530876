//! # State Subcommand
//!
//! Emits a fresh, empty `ClusterState` as JSON — the document a caller
//! feeds to `verify --state` to start a cluster from scratch, or inspects
//! directly to see the persistence document's shape.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use rksv_verify::ClusterState;

/// Arguments for the `rksv-verify state` subcommand.
#[derive(Args, Debug)]
pub struct StateArgs {}

/// Execute the `state` subcommand.
///
/// Always succeeds; exit code is 0.
pub fn run_state(_args: &StateArgs) -> Result<u8> {
    let cluster = ClusterState::new();
    let json = serde_json::to_string_pretty(&cluster)?;
    writeln!(std::io::stdout(), "{json}")?;
    Ok(0)
}
