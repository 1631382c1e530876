//! # Single-Receipt Verifier
//!
//! Checks one receipt's JWS signature against a certificate, either fixed
//! for the whole chunk or resolved per-receipt from a [`KeyStore`]. Two
//! conditions that would otherwise be exceptions are modeled as ordinary
//! result variants instead — see [`SingleVerifyOutcome`].

use rksv_algorithm::AlgorithmRegistry;
use rksv_core::{CertSerial, KeyId, Zda};
use rksv_crypto::Certificate;
use rksv_receipt::Receipt;

use crate::error::ReceiptVerifyError;
use crate::key_store::KeyStore;

/// The outcome of verifying a single receipt's signature.
///
/// `SignatureSystemFailed` and `UnsignedNull` are not failures: they are
/// expected, tolerated conditions the per-register state machine handles
/// explicitly (restore-receipt bookkeeping, and the benign empty-null
/// case respectively). Only `Error` represents an actual verification
/// failure.
#[derive(Debug)]
pub enum SingleVerifyOutcome {
    /// The signature verified successfully.
    Valid,
    /// The receipt carries no signature and is not a null receipt: the
    /// signing device had failed when it was produced.
    SignatureSystemFailed,
    /// The receipt carries no signature but is a null receipt (the
    /// benign, explicitly-unsigned case).
    UnsignedNull,
    /// The signature check failed outright.
    Error(ReceiptVerifyError),
}

/// How the single-receipt verifier resolves a certificate.
pub enum ReceiptVerifier<'a> {
    /// Every receipt in the chunk is checked against the same
    /// certificate (the common case: one `Belege-Gruppe` with one
    /// `Signaturzertifikat`).
    FixedCert(&'a Certificate),
    /// Each receipt's certificate is resolved from a [`KeyStore`] by its
    /// declared ZDA and certificate serial.
    KeyStoreBacked(&'a dyn KeyStore),
}

impl<'a> ReceiptVerifier<'a> {
    /// Verify one receipt's signature.
    ///
    /// `cert_zda` scopes the [`KeyStore`] lookup to the certification
    /// service provider the chunk's certificates were issued under — it is
    /// unrelated to [`Receipt::zda`], the receipt's own operator tag that
    /// marks a closed GGS cluster register.
    pub fn verify(
        &self,
        receipt: &Receipt,
        cert_zda: &Zda,
        registry: &AlgorithmRegistry,
    ) -> SingleVerifyOutcome {
        if receipt.is_signed_broken() {
            return if receipt.is_null() {
                SingleVerifyOutcome::UnsignedNull
            } else {
                SingleVerifyOutcome::SignatureSystemFailed
            };
        }

        let algorithm = match registry.get(receipt.algorithm_prefix()) {
            Ok(algorithm) => algorithm,
            Err(e) => return SingleVerifyOutcome::Error(e.into()),
        };

        let cert = match self {
            ReceiptVerifier::FixedCert(cert) => (*cert),
            ReceiptVerifier::KeyStoreBacked(store) => {
                let Some(serial) = receipt.certificate_serial() else {
                    return SingleVerifyOutcome::Error(ReceiptVerifyError::NoPublicKeyAvailable(
                        receipt.receipt_id().clone(),
                    ));
                };
                let key_id = KeyId::new(cert_zda.clone(), CertSerial::new(serial));
                match store.get(&key_id) {
                    Some(cert) => cert,
                    None => {
                        return SingleVerifyOutcome::Error(ReceiptVerifyError::NoPublicKeyAvailable(
                            receipt.receipt_id().clone(),
                        ))
                    }
                }
            }
        };

        if let (Some(named), Some(actual)) = (receipt.certificate_serial(), Some(cert.serial_decimal()))
        {
            if named != actual {
                return SingleVerifyOutcome::Error(ReceiptVerifyError::CertificateSerialMismatch {
                    receipt_id: receipt.receipt_id().clone(),
                    named: named.to_string(),
                    actual,
                });
            }
        }

        let verifying_key = match cert.verifying_key() {
            Ok(key) => key,
            Err(e) => {
                return SingleVerifyOutcome::Error(ReceiptVerifyError::Algorithm(
                    rksv_algorithm::AlgorithmError::InvalidKey(e.to_string()),
                ))
            }
        };

        match algorithm.verify(&verifying_key, receipt.jws()) {
            Ok(()) => SingleVerifyOutcome::Valid,
            Err(e) => SingleVerifyOutcome::Error(e.into()),
        }
    }
}
