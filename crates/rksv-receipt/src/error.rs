//! Receipt parsing errors.

use thiserror::Error;

/// Errors parsing a receipt from its compact JWS string.
#[derive(Error, Debug)]
pub enum ReceiptParseError {
    /// The JWS did not have three dot-separated segments.
    #[error("malformed JWS: {0}")]
    MalformedJws(String),

    /// A segment was not valid base64url.
    #[error("invalid base64 in {segment}: {reason}")]
    InvalidBase64 {
        /// Which segment failed to decode (`"header"`, `"payload"`, or
        /// `"signature"`).
        segment: &'static str,
        /// The underlying decode error.
        reason: String,
    },

    /// The decoded payload was not the expected JSON array shape.
    #[error("malformed receipt payload: {0}")]
    MalformedPayload(String),

    /// The receipt's algorithm prefix names an algorithm the registry does
    /// not recognize.
    #[error(transparent)]
    UnknownAlgorithm(#[from] rksv_algorithm::AlgorithmError),
}
