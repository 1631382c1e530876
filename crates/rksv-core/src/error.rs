//! # Validation Errors
//!
//! Structured error type for domain-primitive construction failures, built
//! with `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.

use thiserror::Error;

/// Validation failures for the domain newtypes in [`crate::identity`] and
/// [`crate::money`].
///
/// Most identifiers in this crate are unvalidated wrappers around `String`
/// (the wire format imposes no further structure the verifier relies on);
/// this enum exists for the two primitives that do carry a format
/// constraint the rest of the workspace depends on.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A fixed-point amount string did not parse.
    #[error("invalid amount: \"{0}\"")]
    InvalidAmount(String),

    /// A timestamp string is not valid ISO 8601 / RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}
