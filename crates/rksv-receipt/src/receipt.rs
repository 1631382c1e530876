//! # Receipt
//!
//! A single cash-register receipt, parsed once from its compact JWS string
//! and immutable afterward.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use rksv_core::{FixedPoint2, ReceiptId, RegisterId, Zda};

use crate::error::ReceiptParseError;

const TURNOVER_DUMMY_MARKER: &str = "TRA";
const TURNOVER_REVERSAL_MARKER: &str = "STO";

/// The receipt's encrypted running turnover counter, or one of the three
/// sentinel markers the regulation defines in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnoverCounterField {
    /// The normal case: an AES-256-CTR ciphertext to be decrypted and
    /// reconciled against the register's running total.
    Encrypted(Vec<u8>),
    /// `"TRA"` — a training-mode receipt. Never reconciled against the
    /// turnover counter.
    Dummy,
    /// `"STO"` — a reversal (storno) receipt. Updates the counter without
    /// a plaintext comparison.
    Reversal,
    /// Empty — a null receipt (all five sums are zero), marking device
    /// initialization, a restore after signature-system failure, or the
    /// monthly/closing receipt.
    Null,
}

/// A single DEP receipt.
///
/// Construct via [`Receipt::parse`]. All fields are immutable once parsed.
#[derive(Debug, Clone)]
pub struct Receipt {
    algorithm_prefix: String,
    zda: Zda,
    register_id: RegisterId,
    receipt_id: ReceiptId,
    date_time: DateTime<Utc>,
    sum_a: FixedPoint2,
    sum_b: FixedPoint2,
    sum_c: FixedPoint2,
    sum_d: FixedPoint2,
    sum_e: FixedPoint2,
    turnover: TurnoverCounterField,
    certificate_serial: Option<String>,
    previous_chain: Option<Vec<u8>>,
    signature: Option<Vec<u8>>,
    jws: String,
}

#[derive(Deserialize)]
struct PayloadFields(
    String,       // 0: algorithm prefix
    String,       // 1: zda / operator tag ("AT0" marks a closed GGS register)
    String,       // 2: register id
    String,       // 3: receipt id
    String,       // 4: date/time, ISO 8601
    String,       // 5: sum A
    String,       // 6: sum B
    String,       // 7: sum C
    String,       // 8: sum D
    String,       // 9: sum E
    String,       // 10: turnover counter field
    String,       // 11: certificate serial (may be empty)
    String,       // 12: previous chain, base64 (may be empty)
);

impl Receipt {
    /// Parse a receipt from its compact JWS string
    /// (`base64url(header).base64url(payload).base64url(signature)`).
    pub fn parse(jws: &str) -> Result<Self, ReceiptParseError> {
        let mut segments = jws.splitn(3, '.');
        let _header_b64 = segments
            .next()
            .ok_or_else(|| ReceiptParseError::MalformedJws("missing header segment".into()))?;
        let payload_b64 = segments
            .next()
            .ok_or_else(|| ReceiptParseError::MalformedJws("missing payload segment".into()))?;
        let sig_b64 = segments
            .next()
            .ok_or_else(|| ReceiptParseError::MalformedJws("missing signature segment".into()))?;
        if jws.matches('.').count() != 2 {
            return Err(ReceiptParseError::MalformedJws(
                "JWS must have exactly three dot-separated segments".into(),
            ));
        }

        let payload_bytes =
            URL_SAFE_NO_PAD
                .decode(payload_b64)
                .map_err(|e| ReceiptParseError::InvalidBase64 {
                    segment: "payload",
                    reason: e.to_string(),
                })?;
        let fields: PayloadFields = serde_json::from_slice(&payload_bytes)
            .map_err(|e| ReceiptParseError::MalformedPayload(e.to_string()))?;

        let signature = if sig_b64.is_empty() {
            None
        } else {
            Some(URL_SAFE_NO_PAD.decode(sig_b64).map_err(|e| {
                ReceiptParseError::InvalidBase64 {
                    segment: "signature",
                    reason: e.to_string(),
                }
            })?)
        };

        let date_time = DateTime::parse_from_rfc3339(&fields.4)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ReceiptParseError::MalformedPayload(format!("invalid date-time: {e}")))?;

        let parse_sum = |s: &str| -> Result<FixedPoint2, ReceiptParseError> {
            s.parse()
                .map_err(|_| ReceiptParseError::MalformedPayload(format!("invalid amount: \"{s}\"")))
        };

        let turnover = match fields.10.as_str() {
            "" => TurnoverCounterField::Null,
            TURNOVER_DUMMY_MARKER => TurnoverCounterField::Dummy,
            TURNOVER_REVERSAL_MARKER => TurnoverCounterField::Reversal,
            encoded => {
                let bytes = URL_SAFE_NO_PAD.decode(encoded).map_err(|e| {
                    ReceiptParseError::InvalidBase64 {
                        segment: "turnover counter",
                        reason: e.to_string(),
                    }
                })?;
                TurnoverCounterField::Encrypted(bytes)
            }
        };

        let previous_chain = if fields.12.is_empty() {
            None
        } else {
            Some(URL_SAFE_NO_PAD.decode(&fields.12).map_err(|e| {
                ReceiptParseError::InvalidBase64 {
                    segment: "previous chain",
                    reason: e.to_string(),
                }
            })?)
        };

        Ok(Self {
            algorithm_prefix: fields.0,
            zda: Zda::new(fields.1),
            register_id: RegisterId::new(fields.2),
            receipt_id: ReceiptId::new(fields.3),
            date_time,
            sum_a: parse_sum(&fields.5)?,
            sum_b: parse_sum(&fields.6)?,
            sum_c: parse_sum(&fields.7)?,
            sum_d: parse_sum(&fields.8)?,
            sum_e: parse_sum(&fields.9)?,
            turnover,
            certificate_serial: if fields.11.is_empty() { None } else { Some(fields.11) },
            previous_chain,
            signature,
            jws: jws.to_string(),
        })
    }

    /// The algorithm prefix this receipt names (e.g. `"R1"`).
    pub fn algorithm_prefix(&self) -> &str {
        &self.algorithm_prefix
    }

    /// The owning register.
    pub fn register_id(&self) -> &RegisterId {
        &self.register_id
    }

    /// The receipt's operator tag (`zda`). `"AT0"` marks a register that
    /// belongs to a closed GGS cluster rather than an open system signed
    /// through an external certification service provider.
    pub fn zda(&self) -> &Zda {
        &self.zda
    }

    /// The receipt identifier, unique within a cluster.
    pub fn receipt_id(&self) -> &ReceiptId {
        &self.receipt_id
    }

    /// The receipt's declared date and time.
    pub fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }

    /// The five VAT-rate-bucketed sums, in declaration order.
    pub fn sums(&self) -> [FixedPoint2; 5] {
        [self.sum_a, self.sum_b, self.sum_c, self.sum_d, self.sum_e]
    }

    /// The turnover counter field as parsed (encrypted payload or sentinel).
    pub fn turnover(&self) -> &TurnoverCounterField {
        &self.turnover
    }

    /// The certificate serial this receipt was (claimed to be) signed
    /// under, if any — absent when the signing device had failed.
    pub fn certificate_serial(&self) -> Option<&str> {
        self.certificate_serial.as_deref()
    }

    /// The truncated chaining value linking to the previous receipt, if
    /// any — absent for a register's first receipt.
    pub fn previous_chain(&self) -> Option<&[u8]> {
        self.previous_chain.as_deref()
    }

    /// The raw signature bytes, if the receipt was actually signed.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// The full compact JWS string this receipt was parsed from.
    pub fn jws(&self) -> &str {
        &self.jws
    }

    /// Whether all five declared sums are zero.
    ///
    /// A precondition for [`Receipt::is_null`], but checked independently
    /// since several invariants (e.g. `NonzeroTurnoverOnInitialReceipt`)
    /// key off the sums alone.
    pub fn sums_are_zero(&self) -> bool {
        self.sums().iter().all(|s| *s == FixedPoint2::ZERO)
    }

    /// A null receipt: all sums zero and no turnover counter recorded.
    /// Marks device initialization, a post-failure restore, or a
    /// monthly/closing receipt.
    pub fn is_null(&self) -> bool {
        self.sums_are_zero() && matches!(self.turnover, TurnoverCounterField::Null)
    }

    /// A training-mode (dummy) receipt — never reconciled against the
    /// running turnover counter.
    pub fn is_dummy(&self) -> bool {
        matches!(self.turnover, TurnoverCounterField::Dummy)
    }

    /// A reversal (storno) receipt — updates the counter without a
    /// plaintext comparison.
    pub fn is_reversal(&self) -> bool {
        matches!(self.turnover, TurnoverCounterField::Reversal)
    }

    /// A receipt whose signing device had failed: it carries no signature
    /// at all (the JWS's third segment is empty).
    pub fn is_signed_broken(&self) -> bool {
        self.signature.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_jws(turnover_field: &str, previous_chain: &str, sig: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"ES256"}"#);
        let payload = serde_json::to_vec(&(
            "R1",
            "zda",
            "REG-1",
            "0001",
            "2024-03-01T10:00:00Z",
            "0.00",
            "0.00",
            "0.00",
            "0.00",
            "0.00",
            turnover_field,
            "CERT-1",
            previous_chain,
        ))
        .unwrap();
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{payload_b64}.{sig}")
    }

    #[test]
    fn parses_null_receipt() {
        let jws = sample_jws("", "", "");
        let receipt = Receipt::parse(&jws).unwrap();
        assert!(receipt.is_null());
        assert!(receipt.is_signed_broken());
        assert!(receipt.previous_chain().is_none());
    }

    #[test]
    fn parses_dummy_receipt() {
        let jws = sample_jws("TRA", "", "c2ln");
        let receipt = Receipt::parse(&jws).unwrap();
        assert!(receipt.is_dummy());
        assert!(!receipt.is_signed_broken());
    }

    #[test]
    fn parses_reversal_receipt() {
        let jws = sample_jws("STO", "", "c2ln");
        let receipt = Receipt::parse(&jws).unwrap();
        assert!(receipt.is_reversal());
    }

    #[test]
    fn parses_encrypted_turnover() {
        let encoded = URL_SAFE_NO_PAD.encode([1, 2, 3, 4, 5]);
        let jws = sample_jws(&encoded, "", "c2ln");
        let receipt = Receipt::parse(&jws).unwrap();
        match receipt.turnover() {
            TurnoverCounterField::Encrypted(bytes) => assert_eq!(bytes, &vec![1, 2, 3, 4, 5]),
            other => panic!("expected Encrypted, got {other:?}"),
        }
    }

    #[test]
    fn rejects_jws_with_wrong_segment_count() {
        assert!(Receipt::parse("a.b").is_err());
        assert!(Receipt::parse("a.b.c.d").is_err());
    }

    #[test]
    fn rejects_invalid_base64_payload() {
        assert!(Receipt::parse("header.not_valid_base64!!!.sig").is_err());
    }

    #[test]
    fn register_and_receipt_ids_round_trip() {
        let jws = sample_jws("", "", "");
        let receipt = Receipt::parse(&jws).unwrap();
        assert_eq!(receipt.register_id().as_str(), "REG-1");
        assert_eq!(receipt.receipt_id().as_str(), "0001");
    }
}
