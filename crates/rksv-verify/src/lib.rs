#![deny(missing_docs)]

//! # rksv-verify — Receipt-Chain Verification Engine
//!
//! Everything downstream of parsing: single-receipt signature checks,
//! certificate-chain trust walking, the per-register state machine
//! ([`state::verify_group`]), the cluster container ([`cluster::ClusterState`]),
//! and the parallel orchestrator ([`orchestrator::verify_dep`]) tying a
//! [`rksv_receipt::DepParser`] to all of the above.

mod cert_chain;
mod cluster;
mod error;
mod key_store;
mod orchestrator;
mod receipt_verifier;
mod state;

pub use cert_chain::{verify_certificate_chain, SeenSerials};
pub use cluster::ClusterState;
pub use error::{DepError, GroupError, ReceiptVerifyError, VerifyError};
pub use key_store::{InMemoryKeyStore, KeyStore, KeyStoreError};
pub use orchestrator::{verify_dep, OrchestratorOptions};
pub use receipt_verifier::{ReceiptVerifier, SingleVerifyOutcome};
pub use state::{verify_group, CashRegisterState, ClusterStart};
