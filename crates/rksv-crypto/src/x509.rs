//! # X.509 Certificate Binding
//!
//! Thin binding over `x509-parser` providing the two primitives the
//! certificate-chain verifier needs: parsing a DER certificate and
//! confirming that one certificate's signature was produced by another's
//! public key. Revocation checking is explicitly out of scope.

use x509_parser::prelude::*;

use crate::error::CryptoError;
use crate::sha256::sha256;

/// A parsed X.509 certificate, owning its DER bytes.
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    /// Parse a certificate from DER bytes, validating the encoding eagerly.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        X509Certificate::from_der(der)
            .map_err(|e| CryptoError::Certificate(format!("malformed certificate: {e}")))?;
        Ok(Self { der: der.to_vec() })
    }

    fn parsed(&self) -> X509Certificate<'_> {
        // Re-parsing is cheap relative to signature verification and avoids
        // a self-referential struct; validity was already checked in
        // `from_der`.
        X509Certificate::from_der(&self.der)
            .expect("DER validity checked in from_der")
            .1
    }

    /// SHA-256 fingerprint of the DER encoding.
    ///
    /// Two certificates with the same serial under the same issuer but
    /// different fingerprints indicate spoofing — see
    /// `CertificateSerialCollision` in `rksv-verify`.
    pub fn fingerprint(&self) -> [u8; 32] {
        sha256(&self.der)
    }

    /// The certificate's serial number, decimal-encoded.
    pub fn serial_decimal(&self) -> String {
        self.parsed().raw_serial_as_string()
    }

    /// The certificate's subject, RFC 4514 string form.
    pub fn subject(&self) -> String {
        self.parsed().subject().to_string()
    }

    /// The certificate's issuer, RFC 4514 string form.
    pub fn issuer(&self) -> String {
        self.parsed().issuer().to_string()
    }

    /// Whether `self` was signed by `issuer`'s public key.
    pub fn is_signed_by(&self, issuer: &Certificate) -> Result<bool, CryptoError> {
        let child = self.parsed();
        let parent = issuer.parsed();
        match child.verify_signature(Some(parent.public_key())) {
            Ok(()) => Ok(true),
            Err(X509Error::SignatureVerificationError(_)) => Ok(false),
            Err(e) => Err(CryptoError::Certificate(format!(
                "signature verification error: {e}"
            ))),
        }
    }

    /// Verify that a receipt's ES256 signature was produced by the public
    /// key embedded in this certificate.
    pub fn verifying_key(&self) -> Result<crate::ecdsa::EcdsaVerifyingKey, CryptoError> {
        let parsed = self.parsed();
        let spki = parsed.public_key();
        crate::ecdsa::EcdsaVerifyingKey::from_sec1_bytes(spki.subject_public_key.as_ref())
    }
}
