#![deny(missing_docs)]

//! # rksv-receipt — Receipt Model and DEP Parser Contract
//!
//! Defines [`Receipt`], parsed once from its compact JWS string, and the
//! [`DepParser`] trait the verification engine consumes a DEP through.
//! [`JsonDepParser`] is a concrete implementation against the real-world
//! RKSV DEP JSON shape, supplied so the CLI is runnable end to end — the
//! verification crates depend only on the trait.

mod error;
mod json_parser;
mod parser;
mod receipt;

pub use error::ReceiptParseError;
pub use json_parser::{JsonDepParser, JsonDepParserError};
pub use parser::{DepGroup, DepParser};
pub use receipt::{Receipt, TurnoverCounterField};
