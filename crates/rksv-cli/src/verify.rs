//! # Verify Subcommand
//!
//! Verifies a DEP document against a key store, optionally reconciling
//! turnover counters against a symmetric key and extending a prior cluster
//! state read from stdin.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rksv_algorithm::AlgorithmRegistry;
use rksv_receipt::JsonDepParser;
use rksv_verify::{verify_dep, ClusterState, InMemoryKeyStore, OrchestratorOptions};

/// Arguments for the `rksv-verify verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the DEP JSON document to verify.
    pub dep: PathBuf,

    /// Path to the key store document (see `rksv_verify::InMemoryKeyStore`).
    pub key_store: PathBuf,

    /// Path to the raw turnover-counter key. Turnover reconciliation is
    /// skipped for every receipt if omitted.
    #[arg(long)]
    pub turnover_key: Option<PathBuf>,

    /// Pass-through mode: read the prior cluster state as JSON from stdin
    /// before verifying, and write the updated state as JSON to stdout
    /// afterward.
    #[arg(long)]
    pub state: bool,

    /// Continue the last register in the prior state instead of appending
    /// a fresh one. Requires `--state`.
    #[arg(long)]
    pub r#continue: bool,

    /// Worker count for the parallel orchestrator.
    #[arg(long, default_value_t = 1)]
    pub par: usize,

    /// Receipts per chunk handed to a worker (0 = whole file as one chunk).
    #[arg(long, default_value_t = 0)]
    pub chunksize: usize,
}

/// Execute the `verify` subcommand.
///
/// Returns exit code 0 on successful verification, 1 if the DEP fails
/// verification. Malformed input (unreadable files, invalid JSON) is
/// reported as an `Err` rather than an exit code, matching the CLI's
/// convention of only using exit codes for verification outcomes.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let mut cluster = if args.state {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading prior cluster state from stdin")?;
        serde_json::from_str(&buf).context("parsing prior cluster state")?
    } else {
        ClusterState::new()
    };

    let dep_json =
        std::fs::read_to_string(&args.dep).with_context(|| format!("reading {}", args.dep.display()))?;
    let mut parser = JsonDepParser::from_str(&dep_json).context("parsing DEP document")?;

    let key_store_file = std::fs::File::open(&args.key_store)
        .with_context(|| format!("opening {}", args.key_store.display()))?;
    let key_store = InMemoryKeyStore::from_reader(key_store_file).context("loading key store")?;

    let turnover_key = args
        .turnover_key
        .as_ref()
        .map(std::fs::read)
        .transpose()
        .context("reading turnover key")?;

    let registry = AlgorithmRegistry::new();

    let register_index = if args.r#continue {
        Some(cluster.registers.len().saturating_sub(1))
    } else {
        None
    };

    let options = OrchestratorOptions {
        chunk_size: args.chunksize,
        workers: args.par,
    };

    tracing::debug!(
        dep = %args.dep.display(),
        par = args.par,
        chunksize = args.chunksize,
        continue_mode = args.r#continue,
        "starting DEP verification"
    );

    let result = verify_dep(
        &mut parser,
        &key_store,
        &registry,
        turnover_key.as_deref(),
        &mut cluster,
        register_index,
        options,
    );

    if args.state {
        let json = serde_json::to_string_pretty(&cluster)?;
        println!("{json}");
    }

    match result {
        Ok(()) => {
            tracing::info!("DEP verified successfully");
            Ok(0)
        }
        Err(e) => {
            tracing::warn!(error = %e, "DEP verification failed");
            eprintln!("verification failed: {e}");
            Ok(1)
        }
    }
}
