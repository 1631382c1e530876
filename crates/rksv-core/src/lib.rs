#![deny(missing_docs)]

//! # rksv-core — Foundational Types for the RKSV DEP Verifier
//!
//! Defines the identifier newtypes, fixed-point money representation, and
//! structured error hierarchy shared by every other crate in the workspace.
//! Has no internal crate dependencies — only `serde`, `serde_json`,
//! `thiserror`, and `chrono` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`RegisterId`] cannot be
//!    passed where a [`ReceiptId`] is expected, and neither is a bare
//!    `String`.
//!
//! 2. **No floating point in money.** Receipt sums are [`FixedPoint2`], a
//!    signed fixed-point value in hundredths of a currency unit, never `f64`.
//!
//! 3. **[`ValidationError`] hierarchy.** Structured errors with `thiserror` —
//!    no `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod money;
pub mod timestamp;

pub use error::ValidationError;
pub use identity::{CertSerial, KeyId, ReceiptId, RegisterId, Zda};
pub use money::FixedPoint2;
pub use timestamp::Timestamp;
