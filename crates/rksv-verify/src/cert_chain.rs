//! # Certificate-Chain Verifier
//!
//! Walks a `Signaturzertifikat` plus its `Zertifizierungsstellen` issuer
//! chain, confirming each certificate was signed by the next and that the
//! chain terminates at a trust anchor the key store recognizes. Also
//! detects certificate-serial collisions across chunks, which would
//! otherwise let a spoofed certificate with a reused serial slip past a
//! per-chunk-only check.

use std::collections::HashMap;

use rksv_core::{CertSerial, KeyId, Zda};
use rksv_crypto::Certificate;

use crate::error::DepError;
use crate::key_store::KeyStore;

/// Tracks certificate serials seen so far, across chunks, to detect
/// collisions (the same serial under two different fingerprints) even
/// between certificates the key store never names directly — e.g. two
/// intermediate certificates reused with a spoofed serial.
pub type SeenSerials = HashMap<String, [u8; 32]>;

/// Verify a certificate chain (leaf first, issuers following) and return
/// the leaf certificate once confirmed trustworthy.
///
/// Walks the chain upward one certificate at a time. At each step, the
/// certificate's serial is resolved against `key_store` under `cert_zda`
/// (the ZDA the chunk's certificates were issued under): a stored
/// certificate under that serial with a matching fingerprint ends the
/// walk early (spec.md §4.3's "accept and stop"); a matching serial with
/// a *different* fingerprint is `CertificateSerialCollision`. Only once a
/// certificate is absent from the key store does the walk fall back to
/// verifying it was signed by the next certificate up; if the chain is
/// exhausted without a key-store hit, the topmost certificate must itself
/// be a trust anchor.
pub fn verify_certificate_chain(
    der_chain: &[Vec<u8>],
    cert_zda: &Zda,
    key_store: &dyn KeyStore,
    seen_serials: &mut SeenSerials,
) -> Result<Certificate, DepError> {
    if der_chain.is_empty() {
        return Err(DepError::NoCertificateGiven);
    }

    let mut certs = Vec::with_capacity(der_chain.len());
    for der in der_chain {
        let cert = Certificate::from_der(der)
            .map_err(|_| DepError::UntrustedCertificate(CertSerial::new("<unparsable>")))?;
        certs.push(cert);
    }

    for index in 0..certs.len() {
        let serial = certs[index].serial_decimal();
        let fingerprint = certs[index].fingerprint();

        match seen_serials.get(&serial) {
            Some(seen) if *seen != fingerprint => {
                return Err(DepError::CertificateSerialCollision(CertSerial::new(serial)));
            }
            _ => {
                seen_serials.insert(serial.clone(), fingerprint);
            }
        }

        let key_id = KeyId::new(cert_zda.clone(), CertSerial::new(serial.clone()));
        if let Some(stored) = key_store.get(&key_id) {
            if stored.fingerprint() == fingerprint {
                let leaf = Certificate::from_der(&der_chain[0])
                    .expect("already parsed successfully above");
                return Ok(leaf);
            }
            return Err(DepError::CertificateSerialCollision(CertSerial::new(serial)));
        }

        match certs.get(index + 1) {
            Some(parent) => {
                let signed = certs[index]
                    .is_signed_by(parent)
                    .map_err(|_| DepError::CertificateChainBroken {
                        leaf: CertSerial::new(certs[index].serial_decimal()),
                        signer: CertSerial::new(parent.serial_decimal()),
                    })?;
                if !signed {
                    return Err(DepError::CertificateChainBroken {
                        leaf: CertSerial::new(certs[index].serial_decimal()),
                        signer: CertSerial::new(parent.serial_decimal()),
                    });
                }
            }
            None => {
                if !key_store.is_trusted_anchor(&fingerprint) {
                    return Err(DepError::UntrustedCertificate(CertSerial::new(serial)));
                }
            }
        }
    }

    let leaf = Certificate::from_der(&der_chain[0]).expect("already parsed successfully above");
    Ok(leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_store::InMemoryKeyStore;

    #[test]
    fn empty_chain_is_no_certificate_given() {
        let store = InMemoryKeyStore::from_str(r#"{"certificates": {}}"#).unwrap();
        let mut seen = SeenSerials::new();
        let result = verify_certificate_chain(&[], &Zda::new("zda"), &store, &mut seen);
        assert!(matches!(result, Err(DepError::NoCertificateGiven)));
    }

    #[test]
    fn unparsable_certificate_is_untrusted() {
        let store = InMemoryKeyStore::from_str(r#"{"certificates": {}}"#).unwrap();
        let mut seen = SeenSerials::new();
        let result = verify_certificate_chain(&[vec![0u8; 4]], &Zda::new("zda"), &store, &mut seen);
        assert!(matches!(result, Err(DepError::UntrustedCertificate(_))));
    }
}
