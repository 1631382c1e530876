//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `rksv-crypto`.
//! Uses `thiserror` for ergonomic error definitions with diagnostic context.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// ECDSA P-256 signature verification failed.
    #[error("ECDSA verification failed: {0}")]
    VerificationFailed(String),

    /// A supplied signing/verifying key was the wrong length or not a
    /// valid curve point.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// A supplied signature was malformed.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// AES-CTR turnover counter payload had an unexpected size.
    #[error("invalid turnover counter payload: {0}")]
    InvalidTurnoverPayload(String),

    /// X.509 certificate parsing or verification failure.
    #[error("certificate error: {0}")]
    Certificate(String),
}
