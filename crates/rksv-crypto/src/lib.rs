//! # rksv-crypto — Cryptographic Primitives for the RKSV DEP Verifier
//!
//! Binds the low-level cryptographic primitives the verification engine
//! consumes but does not implement itself:
//!
//! - **SHA-256** chaining-value and IV-derivation digests ([`sha256`]).
//! - **ECDSA P-256 (ES256)** JWS signing and verification ([`ecdsa`]).
//! - **AES-256-CTR** turnover-counter encryption and decryption ([`aes_ctr`]).
//! - **X.509** certificate parsing and chain-signature verification
//!   ([`x509`]).
//!
//! Every other crate in the workspace reaches `sha2`, `p256`/`ecdsa`,
//! `aes`/`ctr`, and `x509-parser` only through this crate.

pub mod aes_ctr;
pub mod ecdsa;
pub mod error;
pub mod sha256;
pub mod x509;

pub use ecdsa::{EcdsaSignature, EcdsaSigningKey, EcdsaVerifyingKey};
pub use error::CryptoError;
pub use sha256::{sha256, sha256_truncated};
pub use x509::Certificate;
