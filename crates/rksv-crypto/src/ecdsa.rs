//! # ECDSA P-256 (ES256) Signing and Verification
//!
//! Provides the ECDSA-over-P-256 signatures RKSV receipts are signed with,
//! using the `p256`/`ecdsa`/`signature` crates. A receipt's JWS uses the
//! literal header `{"alg":"ES256"}`; this module binds the curve operation
//! the algorithm layer wraps.
//!
//! ## Serde
//!
//! Public keys and signatures serialize as lowercase hex strings.

use ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::error::CryptoError;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn hex_to_bytes(s: &str) -> Result<Vec<u8>, CryptoError> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err(CryptoError::InvalidKey(format!(
            "hex string has odd length: {}",
            s.len()
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| CryptoError::InvalidKey(format!("invalid hex at position {i}: {e}")))
        })
        .collect()
}

/// An ECDSA P-256 signature in fixed-size `r || s` form (64 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdsaSignature(Signature);

impl EcdsaSignature {
    /// Construct from the fixed-size `r || s` byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        Signature::from_slice(bytes)
            .map(Self)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }

    /// Access the raw `r || s` byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    /// Encode as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.to_bytes())
    }

    /// Decode from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&hex_to_bytes(s)?)
    }
}

impl Serialize for EcdsaSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EcdsaSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// An ECDSA P-256 signing (private) key.
///
/// Does not implement `Serialize`; private keys must not be casually
/// written to disk. Zeroized on drop.
pub struct EcdsaSigningKey {
    inner: P256SigningKey,
}

impl EcdsaSigningKey {
    /// Generate a new random signing key.
    pub fn generate<R: rand_core::CryptoRngCore>(csprng: &mut R) -> Self {
        Self {
            inner: P256SigningKey::random(csprng),
        }
    }

    /// Construct from raw 32-byte scalar material.
    ///
    /// This is the `verifyKey()` entry point for the algorithm layer: a
    /// valid P-256 private scalar is exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKey(format!(
                "expected 32-byte P-256 scalar, got {} bytes",
                bytes.len()
            )));
        }
        let inner = P256SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Derive the corresponding public verifying key.
    pub fn verifying_key(&self) -> EcdsaVerifyingKey {
        EcdsaVerifyingKey {
            inner: *self.inner.verifying_key(),
        }
    }

    /// Sign a payload, producing a fixed-size `r || s` signature.
    ///
    /// The caller supplies the exact bytes that go over the wire as the
    /// JWS signing input (`b64url(header) + "." + b64url(payload)`); this
    /// module performs no canonicalization of its own.
    pub fn sign(&self, data: &[u8]) -> EcdsaSignature {
        let sig: Signature = self.inner.sign(data);
        EcdsaSignature(sig)
    }

    /// Export the raw 32-byte scalar.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes().to_vec()
    }
}

impl std::fmt::Debug for EcdsaSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcdsaSigningKey")
            .field("public", &self.verifying_key().to_hex())
            .finish()
    }
}

impl Drop for EcdsaSigningKey {
    fn drop(&mut self) {
        let mut bytes = self.inner.to_bytes();
        bytes.zeroize();
    }
}

/// An ECDSA P-256 verifying (public) key, SEC1-encoded.
#[derive(Debug, Clone)]
pub struct EcdsaVerifyingKey {
    inner: P256VerifyingKey,
}

impl EcdsaVerifyingKey {
    /// Construct from a SEC1 point encoding (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let inner =
            P256VerifyingKey::from_sec1_bytes(bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Construct from a hex-encoded SEC1 point.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Self::from_sec1_bytes(&hex_to_bytes(s)?)
    }

    /// Encode as the uncompressed SEC1 point, hex-encoded.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(self.inner.to_encoded_point(false).as_bytes())
    }

    /// Verify a signature over a payload.
    ///
    /// The caller supplies the exact JWS signing input bytes, mirroring
    /// [`EcdsaSigningKey::sign`].
    pub fn verify(&self, data: &[u8], signature: &EcdsaSignature) -> Result<(), CryptoError> {
        self.inner
            .verify(data, &signature.0)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl PartialEq for EcdsaVerifyingKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for EcdsaVerifyingKey {}

impl Serialize for EcdsaVerifyingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EcdsaVerifyingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
