//! # AES-256-CTR Turnover Counter Encryption
//!
//! The `R1` algorithm stores each receipt's running turnover counter
//! encrypted with a register-specific AES-256 key in CTR mode. The IV is
//! not transmitted: it is re-derived deterministically as the first 16
//! bytes of `SHA256(register_id || receipt_id)`, and the plaintext is the
//! turnover value's signed big-endian two's-complement encoding, sized to
//! fit (5 to 16 bytes).

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::error::CryptoError;
use crate::sha256::sha256;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// Derive the IV used for a given register/receipt pair.
///
/// `SHA256(register_id || receipt_id)`, truncated to the first 16 bytes.
pub fn derive_iv(register_id: &str, receipt_id: &str) -> [u8; 16] {
    let mut input = Vec::with_capacity(register_id.len() + receipt_id.len());
    input.extend_from_slice(register_id.as_bytes());
    input.extend_from_slice(receipt_id.as_bytes());
    let digest = sha256(&input);
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&digest[..16]);
    iv
}

/// Encode a signed turnover value as big-endian two's-complement bytes of
/// the smallest size in `5..=16` that can represent it.
pub fn encode_signed_minimal(value: i64) -> Vec<u8> {
    for size in 5..=16usize {
        let bits = size * 8;
        let min = if bits >= 64 { i64::MIN } else { -(1i64 << (bits - 1)) };
        let max = if bits >= 64 { i64::MAX } else { (1i64 << (bits - 1)) - 1 };
        if value >= min && value <= max {
            return to_twos_complement(value, size);
        }
    }
    to_twos_complement(value, 16)
}

fn to_twos_complement(value: i64, size: usize) -> Vec<u8> {
    let full = value.to_be_bytes();
    let mut out = vec![if value < 0 { 0xffu8 } else { 0x00u8 }; size];
    let copy_len = size.min(8);
    out[size - copy_len..].copy_from_slice(&full[8 - copy_len..]);
    out
}

fn from_twos_complement(bytes: &[u8]) -> Result<i64, CryptoError> {
    if bytes.is_empty() || bytes.len() > 16 {
        return Err(CryptoError::InvalidTurnoverPayload(format!(
            "expected 5 to 16 bytes, got {}",
            bytes.len()
        )));
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut acc: i128 = if negative { -1 } else { 0 };
    for &b in bytes {
        acc = (acc << 8) | i128::from(b);
    }
    // Sign-extend out of the byte width we accumulated into.
    let bits = bytes.len() * 8;
    if bits < 128 {
        let shift = 128 - bits;
        acc = (acc << shift) >> shift;
    }
    i64::try_from(acc)
        .map_err(|_| CryptoError::InvalidTurnoverPayload("value does not fit in i64".into()))
}

/// Encrypt a turnover counter value for the given register/receipt pair.
///
/// `key` must be exactly 32 bytes (AES-256). Returns the ciphertext, which
/// is the same length as [`encode_signed_minimal`]'s output.
pub fn encrypt_turnover_counter(
    key: &[u8],
    register_id: &str,
    receipt_id: &str,
    value: i64,
) -> Result<Vec<u8>, CryptoError> {
    let mut buf = encode_signed_minimal(value);
    apply_ctr(key, register_id, receipt_id, &mut buf)?;
    Ok(buf)
}

/// Decrypt a turnover counter payload for the given register/receipt pair.
pub fn decrypt_turnover_counter(
    key: &[u8],
    register_id: &str,
    receipt_id: &str,
    ciphertext: &[u8],
) -> Result<i64, CryptoError> {
    let mut buf = ciphertext.to_vec();
    apply_ctr(key, register_id, receipt_id, &mut buf)?;
    from_twos_complement(&buf)
}

fn apply_ctr(
    key: &[u8],
    register_id: &str,
    receipt_id: &str,
    buf: &mut [u8],
) -> Result<(), CryptoError> {
    if key.len() != 32 {
        return Err(CryptoError::InvalidKey(format!(
            "expected 32-byte AES-256 key, got {} bytes",
            key.len()
        )));
    }
    let iv = derive_iv(register_id, receipt_id);
    let mut cipher = Aes256Ctr::new(key.into(), (&iv).into());
    cipher.apply_keystream(buf);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [7u8; 32];

    #[test]
    fn encrypt_then_decrypt_roundtrips() {
        let value = 123_456i64;
        let ct = encrypt_turnover_counter(&KEY, "R-1", "0001", value).unwrap();
        let pt = decrypt_turnover_counter(&KEY, "R-1", "0001", &ct).unwrap();
        assert_eq!(pt, value);
    }

    #[test]
    fn roundtrips_negative_values() {
        let value = -42i64;
        let ct = encrypt_turnover_counter(&KEY, "R-1", "0002", value).unwrap();
        let pt = decrypt_turnover_counter(&KEY, "R-1", "0002", &ct).unwrap();
        assert_eq!(pt, value);
    }

    #[test]
    fn roundtrips_zero() {
        let ct = encrypt_turnover_counter(&KEY, "R-1", "0000", 0).unwrap();
        let pt = decrypt_turnover_counter(&KEY, "R-1", "0000", &ct).unwrap();
        assert_eq!(pt, 0);
    }

    #[test]
    fn different_receipt_ids_produce_different_ciphertext() {
        let a = encrypt_turnover_counter(&KEY, "R-1", "0001", 100).unwrap();
        let b = encrypt_turnover_counter(&KEY, "R-1", "0002", 100).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_non_32_byte_key() {
        assert!(encrypt_turnover_counter(&[0u8; 16], "R-1", "0001", 1).is_err());
    }

    #[test]
    fn encode_signed_minimal_uses_five_bytes_for_small_values() {
        assert_eq!(encode_signed_minimal(0).len(), 5);
        assert_eq!(encode_signed_minimal(100).len(), 5);
    }

    #[test]
    fn encode_signed_minimal_grows_for_large_values() {
        let bytes = encode_signed_minimal(i64::MAX);
        assert!(bytes.len() > 5);
    }

    #[test]
    fn decrypt_rejects_oversized_payload() {
        let err = decrypt_turnover_counter(&KEY, "R-1", "0001", &[0u8; 20]);
        assert!(err.is_err());
    }

    #[test]
    fn iv_derivation_is_deterministic() {
        assert_eq!(derive_iv("R-1", "0001"), derive_iv("R-1", "0001"));
        assert_ne!(derive_iv("R-1", "0001"), derive_iv("R-1", "0002"));
    }
}
