#![deny(missing_docs)]

//! # rksv-algorithm — Algorithm Abstraction and the `R1` Registry Entry
//!
//! An RKSV receipt names an algorithm by a short version prefix (only
//! `"R1"` is defined by the regulation today). The [`Algorithm`] trait
//! captures everything the verifier needs from an algorithm: how chaining
//! values are computed, how JWS signatures are checked, how turnover
//! counters are encrypted. [`AlgorithmRegistry`] resolves a prefix to an
//! implementation; nothing downstream matches on the prefix string itself.

mod error;
mod r1;
mod registry;

pub use error::AlgorithmError;
pub use r1::R1;
pub use registry::AlgorithmRegistry;

/// The capability set a receipt-chain algorithm must provide.
///
/// Implementations are looked up by [`Algorithm::id`] through an
/// [`AlgorithmRegistry`]; callers never match on the id string directly.
pub trait Algorithm: Send + Sync {
    /// The short algorithm identifier a receipt names (e.g. `"R1"`).
    fn id(&self) -> &'static str;

    /// The literal JWS protected header this algorithm signs with.
    fn jws_header(&self) -> &'static str;

    /// The JWS `alg` value this algorithm uses (e.g. `"ES256"`).
    fn signature_algorithm_id(&self) -> &'static str;

    /// The number of bytes a chaining value is truncated to.
    fn chain_byte_count(&self) -> usize;

    /// Hash arbitrary bytes with this algorithm's hash function.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Compute the chaining value for a receipt given its register id and
    /// the previous receipt's JWS string (`None` for the register's first
    /// receipt).
    fn chain(&self, register_id: &str, previous_jws: Option<&str>) -> Vec<u8>;

    /// Sign a JWS `header.payload` signing input, returning the full
    /// compact-serialized JWS string.
    fn sign(
        &self,
        signing_key: &rksv_crypto::EcdsaSigningKey,
        header_b64: &str,
        payload_b64: &str,
    ) -> String;

    /// Verify a compact-serialized JWS string's signature.
    fn verify(
        &self,
        verifying_key: &rksv_crypto::EcdsaVerifyingKey,
        jws: &str,
    ) -> Result<(), AlgorithmError>;

    /// Validate that raw key material is usable as a signing key for this
    /// algorithm (e.g. exactly 32 bytes for a P-256 scalar).
    fn validate_key(&self, key_bytes: &[u8]) -> Result<(), AlgorithmError>;

    /// Encrypt a turnover counter value for a given register/receipt pair.
    fn encrypt_turnover_counter(
        &self,
        key: &[u8],
        register_id: &str,
        receipt_id: &str,
        value: i64,
    ) -> Result<Vec<u8>, AlgorithmError>;

    /// Decrypt a turnover counter payload for a given register/receipt pair.
    fn decrypt_turnover_counter(
        &self,
        key: &[u8],
        register_id: &str,
        receipt_id: &str,
        ciphertext: &[u8],
    ) -> Result<i64, AlgorithmError>;
}
