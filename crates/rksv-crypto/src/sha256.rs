//! # SHA-256 Digest Computation
//!
//! Plain byte hashing used for chaining-value computation and turnover
//! counter IV derivation. Every SHA-256 call in the workspace flows through
//! this module; no other crate imports `sha2` directly.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of raw bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute SHA-256 and truncate to the first `n` bytes.
///
/// Used for chaining values, which are truncated digests (the byte count
/// an `rksv_algorithm::Algorithm` impl names via `chain_byte_count`).
pub fn sha256_truncated(data: &[u8], n: usize) -> Vec<u8> {
    let digest = sha256(data);
    digest[..n.min(32)].to_vec()
}
