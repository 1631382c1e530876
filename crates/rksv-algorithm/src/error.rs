//! Algorithm-layer errors.

use thiserror::Error;

/// Errors surfaced by [`crate::Algorithm`] implementations and
/// [`crate::AlgorithmRegistry`] lookups.
#[derive(Error, Debug)]
pub enum AlgorithmError {
    /// A receipt named an algorithm prefix the registry has no
    /// implementation for.
    #[error("unknown algorithm: \"{0}\"")]
    Unknown(String),

    /// A JWS string did not have the expected three-segment compact form.
    #[error("malformed JWS: {0}")]
    MalformedJws(String),

    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    SignatureInvalid(#[from] rksv_crypto::CryptoError),

    /// Supplied key material was invalid for this algorithm.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}
