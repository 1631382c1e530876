//! # Key Store Contract
//!
//! The certificate-chain verifier resolves certificates and trust anchors
//! through [`KeyStore`]; it never reads a file itself. [`InMemoryKeyStore`]
//! loads a `serde_json` document mapping canonical key ids to DER
//! certificates, matching the regulation's key-store file convention.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use rksv_core::KeyId;
use rksv_crypto::Certificate;

/// A source of trusted certificates, keyed by [`KeyId`].
///
/// `Send + Sync` so the parallel orchestrator can share one key store
/// across worker threads without cloning it per chunk.
pub trait KeyStore: Send + Sync {
    /// Resolve a certificate by its canonical key id.
    fn get(&self, key_id: &KeyId) -> Option<&Certificate>;

    /// Whether the given fingerprint is a configured trust anchor (a root
    /// the certificate chain may terminate at).
    fn is_trusted_anchor(&self, fingerprint: &[u8; 32]) -> bool;
}

/// Errors loading an [`InMemoryKeyStore`].
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// The document was not valid JSON or not the expected shape.
    #[error("malformed key store document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A certificate entry was not valid base64.
    #[error("invalid base64 certificate for key \"{0}\"")]
    InvalidBase64(String),

    /// A certificate entry did not parse as DER.
    #[error("invalid certificate for key \"{key}\": {reason}")]
    InvalidCertificate {
        /// The key id the bad certificate was stored under.
        key: String,
        /// Why the certificate failed to parse.
        reason: String,
    },

    /// Reading the underlying source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Deserialize)]
struct KeyStoreDocument {
    /// Maps `"<zda>:<serial>"` to a base64 DER certificate.
    certificates: HashMap<String, String>,
    /// Base64 DER certificates trusted as chain-terminating anchors.
    #[serde(default)]
    trust_anchors: Vec<String>,
}

/// An in-memory, JSON-file-backed [`KeyStore`].
pub struct InMemoryKeyStore {
    certificates: HashMap<String, Certificate>,
    trust_anchor_fingerprints: HashSet<[u8; 32]>,
}

impl InMemoryKeyStore {
    /// Load a key store from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, KeyStoreError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_str(&buf)
    }

    /// Load a key store from an in-memory JSON string.
    pub fn from_str(json: &str) -> Result<Self, KeyStoreError> {
        let doc: KeyStoreDocument = serde_json::from_str(json)?;

        let mut certificates = HashMap::with_capacity(doc.certificates.len());
        for (key, base64_der) in doc.certificates {
            let der = BASE64_STANDARD
                .decode(&base64_der)
                .map_err(|_| KeyStoreError::InvalidBase64(key.clone()))?;
            let cert = Certificate::from_der(&der).map_err(|e| KeyStoreError::InvalidCertificate {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            certificates.insert(key, cert);
        }

        let mut trust_anchor_fingerprints = HashSet::with_capacity(doc.trust_anchors.len());
        for (i, base64_der) in doc.trust_anchors.iter().enumerate() {
            let der = BASE64_STANDARD
                .decode(base64_der)
                .map_err(|_| KeyStoreError::InvalidBase64(format!("trust_anchors[{i}]")))?;
            let cert = Certificate::from_der(&der).map_err(|e| KeyStoreError::InvalidCertificate {
                key: format!("trust_anchors[{i}]"),
                reason: e.to_string(),
            })?;
            trust_anchor_fingerprints.insert(cert.fingerprint());
        }

        Ok(Self {
            certificates,
            trust_anchor_fingerprints,
        })
    }
}

impl KeyStore for InMemoryKeyStore {
    fn get(&self, key_id: &KeyId) -> Option<&Certificate> {
        self.certificates.get(&key_id.to_string())
    }

    fn is_trusted_anchor(&self, fingerprint: &[u8; 32]) -> bool {
        self.trust_anchor_fingerprints.contains(fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_document() {
        assert!(InMemoryKeyStore::from_str("not json").is_err());
    }

    #[test]
    fn empty_document_has_no_certificates() {
        let store = InMemoryKeyStore::from_str(r#"{"certificates": {}}"#).unwrap();
        let key = KeyId::new(rksv_core::Zda::new("zda"), rksv_core::CertSerial::new("1"));
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn rejects_invalid_certificate_base64() {
        let json = r#"{"certificates": {"zda:1": "not-base64!!"}}"#;
        assert!(InMemoryKeyStore::from_str(json).is_err());
    }
}
