//! # rksv-cli — CLI Tool for the RKSV DEP Verifier
//!
//! Provides the `rksv-verify` command-line interface.
//!
//! ## Subcommands
//!
//! - `rksv-verify state` — emit an empty cluster state as JSON.
//! - `rksv-verify verify` — verify a DEP against a key store and optional
//!   turnover key, with `--continue` and `--state` pass-through support.

pub mod state;
pub mod verify;
