//! # rksv-verify CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rksv_cli::state::{run_state, StateArgs};
use rksv_cli::verify::{run_verify, VerifyArgs};

/// RKSV DEP verifier.
///
/// Verifies a Data Export Package's receipt chain against a key store:
/// signatures, chain hashes, receipt-ID uniqueness, turnover-counter
/// reconciliation, and GGS cluster linkage between registers.
#[derive(Parser, Debug)]
#[command(name = "rksv-verify", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Emit an empty cluster state as JSON.
    State(StateArgs),

    /// Verify a DEP against a key store and optional turnover key.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("rksv-verify CLI starting");

    let result = match cli.command {
        Commands::State(args) => run_state(&args),
        Commands::Verify(args) => run_verify(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
