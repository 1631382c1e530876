//! The `R1` algorithm: SHA-256 chaining, ECDSA P-256 (ES256) JWS
//! signatures, AES-256-CTR turnover counter encryption.
//!
//! Chaining value: `SHA256(previous_jws)` if a previous receipt exists,
//! else `SHA256(register_id)`, truncated to 8 bytes. The JWS protected
//! header is the fixed literal `{"alg":"ES256"}` — there is no header
//! parameter negotiation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use rksv_crypto::{aes_ctr, ecdsa, sha256, EcdsaSigningKey, EcdsaVerifyingKey};

use crate::error::AlgorithmError;
use crate::Algorithm;

const JWS_HEADER: &str = r#"{"alg":"ES256"}"#;
const CHAIN_BYTES: usize = 8;

/// The `R1` algorithm defined by the RKSV regulation.
#[derive(Debug, Default, Clone, Copy)]
pub struct R1;

impl Algorithm for R1 {
    fn id(&self) -> &'static str {
        "R1"
    }

    fn jws_header(&self) -> &'static str {
        JWS_HEADER
    }

    fn signature_algorithm_id(&self) -> &'static str {
        "ES256"
    }

    fn chain_byte_count(&self) -> usize {
        CHAIN_BYTES
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        sha256::sha256(data).to_vec()
    }

    fn chain(&self, register_id: &str, previous_jws: Option<&str>) -> Vec<u8> {
        let input: &[u8] = match previous_jws {
            Some(jws) => jws.as_bytes(),
            None => register_id.as_bytes(),
        };
        sha256::sha256_truncated(input, self.chain_byte_count())
    }

    fn sign(
        &self,
        signing_key: &EcdsaSigningKey,
        header_b64: &str,
        payload_b64: &str,
    ) -> String {
        let signing_input = format!("{header_b64}.{payload_b64}");
        let signature = signing_key.sign(signing_input.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());
        format!("{signing_input}.{sig_b64}")
    }

    fn verify(
        &self,
        verifying_key: &EcdsaVerifyingKey,
        jws: &str,
    ) -> Result<(), AlgorithmError> {
        let mut parts = jws.splitn(3, '.');
        let header_b64 = parts
            .next()
            .ok_or_else(|| AlgorithmError::MalformedJws("missing header segment".into()))?;
        let payload_b64 = parts
            .next()
            .ok_or_else(|| AlgorithmError::MalformedJws("missing payload segment".into()))?;
        let sig_b64 = parts
            .next()
            .ok_or_else(|| AlgorithmError::MalformedJws("missing signature segment".into()))?;
        if parts.next().is_some() {
            return Err(AlgorithmError::MalformedJws(
                "JWS has more than three segments".into(),
            ));
        }
        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|e| AlgorithmError::MalformedJws(format!("invalid signature base64: {e}")))?;
        let signature = ecdsa::EcdsaSignature::from_bytes(&sig_bytes)
            .map_err(|e| AlgorithmError::InvalidKey(e.to_string()))?;
        let signing_input = format!("{header_b64}.{payload_b64}");
        verifying_key
            .verify(signing_input.as_bytes(), &signature)
            .map_err(AlgorithmError::SignatureInvalid)
    }

    fn validate_key(&self, key_bytes: &[u8]) -> Result<(), AlgorithmError> {
        if key_bytes.len() != 32 {
            return Err(AlgorithmError::InvalidKey(format!(
                "R1 requires a 32-byte AES-256 turnover key, got {} bytes",
                key_bytes.len()
            )));
        }
        Ok(())
    }

    fn encrypt_turnover_counter(
        &self,
        key: &[u8],
        register_id: &str,
        receipt_id: &str,
        value: i64,
    ) -> Result<Vec<u8>, AlgorithmError> {
        aes_ctr::encrypt_turnover_counter(key, register_id, receipt_id, value)
            .map_err(|e| AlgorithmError::InvalidKey(e.to_string()))
    }

    fn decrypt_turnover_counter(
        &self,
        key: &[u8],
        register_id: &str,
        receipt_id: &str,
        ciphertext: &[u8],
    ) -> Result<i64, AlgorithmError> {
        aes_ctr::decrypt_turnover_counter(key, register_id, receipt_id, ciphertext)
            .map_err(|e| AlgorithmError::InvalidKey(e.to_string()))
    }
}
