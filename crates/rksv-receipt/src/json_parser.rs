//! # JSON DEP Parser
//!
//! Reads the real-world RKSV DEP JSON shape:
//!
//! ```json
//! {
//!   "Belege-Gruppe": [
//!     {
//!       "Signaturzertifikat": "<base64 DER>",
//!       "Zertifizierungsstellen": ["<base64 DER>", ...],
//!       "Belege": ["<jws>", ...]
//!     }
//!   ]
//! }
//! ```
//!
//! `Signaturzertifikat` is optional on the wire: a group whose signing
//! device could not attach one is represented by its absence, not an
//! empty string, so the orchestrator can distinguish "no certificate" from
//! "certificate decode failed".
//!
//! Honors a configurable chunk size: [`JsonDepParser::next_chunk`] batches
//! whole `Belege-Gruppe` entries together until the accumulated receipt
//! count reaches `chunk_size` (`0` means "whole file, one chunk"). A
//! group's own receipts are never split across two chunks, so a chunk may
//! overshoot `chunk_size` by up to one group's length.

use std::collections::VecDeque;
use std::io::Read;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

use rksv_core::Zda;

use crate::parser::{DepGroup, DepParser};

/// Errors reading or decoding a JSON DEP document.
#[derive(Error, Debug)]
pub enum JsonDepParserError {
    /// The input was not valid JSON, or not the expected shape.
    #[error("malformed DEP document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A certificate field was not valid base64.
    #[error("invalid base64 certificate: {0}")]
    InvalidCertificateBase64(String),

    /// Reading the underlying source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Deserialize)]
struct DepDocument {
    #[serde(rename = "Belege-Gruppe")]
    belege_gruppe: Vec<RawGroup>,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(rename = "Signaturzertifikat", default)]
    signaturzertifikat: Option<String>,
    #[serde(rename = "Zertifizierungsstellen", default)]
    zertifizierungsstellen: Vec<String>,
    #[serde(rename = "Belege")]
    belege: Vec<String>,
}

/// A [`DepParser`] reading the JSON DEP shape above.
pub struct JsonDepParser {
    groups: VecDeque<DepGroup>,
}

impl JsonDepParser {
    /// Parse a DEP document from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, JsonDepParserError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_str(&buf)
    }

    /// Parse a DEP document from an in-memory JSON string.
    pub fn from_str(json: &str) -> Result<Self, JsonDepParserError> {
        let doc: DepDocument = serde_json::from_str(json)?;
        let mut groups = VecDeque::with_capacity(doc.belege_gruppe.len());

        for (index, raw) in doc.belege_gruppe.into_iter().enumerate() {
            let certificate = raw
                .signaturzertifikat
                .as_deref()
                .map(decode_cert)
                .transpose()?;
            let chain = raw
                .zertifizierungsstellen
                .iter()
                .map(|c| decode_cert(c))
                .collect::<Result<Vec<_>, _>>()?;

            // The ZDA isn't a distinct wire field in this DEP shape — it's
            // carried only as an opaque grouping key derived from the
            // signing certificate's base64 form (stable across chunks of
            // the same group), falling back to a positional placeholder
            // for certificate-less groups.
            let zda = match &raw.signaturzertifikat {
                Some(cert) => Zda::new(cert.clone()),
                None => Zda::new(format!("group-{index}")),
            };

            groups.push_back(DepGroup {
                zda,
                certificate,
                chain,
                receipts: raw.belege,
            });
        }

        Ok(Self { groups })
    }
}

fn decode_cert(base64: &str) -> Result<Vec<u8>, JsonDepParserError> {
    BASE64_STANDARD
        .decode(base64)
        .map_err(|e| JsonDepParserError::InvalidCertificateBase64(e.to_string()))
}

impl DepParser for JsonDepParser {
    type Error = JsonDepParserError;

    fn next_chunk(&mut self, chunk_size: usize) -> Result<Option<Vec<DepGroup>>, Self::Error> {
        if self.groups.is_empty() {
            return Ok(None);
        }

        if chunk_size == 0 {
            let chunk: Vec<_> = self.groups.drain(..).collect();
            tracing::debug!(groups = chunk.len(), "emitting whole-file chunk");
            return Ok(Some(chunk));
        }

        let mut chunk = Vec::new();
        let mut total = 0usize;
        while let Some(front) = self.groups.front() {
            if total > 0 && total >= chunk_size {
                break;
            }
            let group = self.groups.pop_front().expect("checked front above");
            total += group.receipts.len();
            chunk.push(group);
        }

        tracing::debug!(groups = chunk.len(), receipts = total, "emitting chunk");
        Ok(Some(chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_cert(chunk_receipts: &[&str]) -> String {
        let belege: Vec<String> = chunk_receipts.iter().map(|s| format!("\"{s}\"")).collect();
        format!(
            r#"{{"Belege-Gruppe": [{{"Signaturzertifikat": "{}", "Zertifizierungsstellen": [], "Belege": [{}]}}]}}"#,
            BASE64_STANDARD.encode(b"cert"),
            belege.join(",")
        )
    }

    #[test]
    fn whole_file_mode_yields_a_single_chunk() {
        let json = doc_with_cert(&["a.b.c", "d.e.f"]);
        let mut parser = JsonDepParser::from_str(&json).unwrap();
        let chunk = parser.next_chunk(0).unwrap().unwrap();
        assert_eq!(chunk.len(), 1);
        assert_eq!(chunk[0].receipts, vec!["a.b.c", "d.e.f"]);
        assert!(parser.next_chunk(0).unwrap().is_none());
    }

    #[test]
    fn batches_multiple_groups_into_one_chunk() {
        let json = format!(
            r#"{{"Belege-Gruppe": [
                {{"Signaturzertifikat": "{cert}", "Belege": ["a.b.c"]}},
                {{"Signaturzertifikat": "{cert}", "Belege": ["d.e.f"]}},
                {{"Signaturzertifikat": "{cert}", "Belege": ["g.h.i"]}}
            ]}}"#,
            cert = BASE64_STANDARD.encode(b"cert")
        );
        let mut parser = JsonDepParser::from_str(&json).unwrap();
        let chunk = parser.next_chunk(2).unwrap().unwrap();
        assert_eq!(chunk.len(), 2);
        let second = parser.next_chunk(2).unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert!(parser.next_chunk(2).unwrap().is_none());
    }

    #[test]
    fn missing_certificate_is_none_not_empty_string() {
        let json = r#"{"Belege-Gruppe": [{"Belege": []}]}"#;
        let mut parser = JsonDepParser::from_str(json).unwrap();
        let chunk = parser.next_chunk(0).unwrap().unwrap();
        assert!(chunk[0].certificate.is_none());
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let json = r#"{"Belege-Gruppe": []}"#;
        let mut parser = JsonDepParser::from_str(json).unwrap();
        assert!(parser.next_chunk(0).unwrap().is_none());
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(JsonDepParser::from_str("{}").is_err());
    }

    #[test]
    fn rejects_invalid_certificate_base64() {
        let json = r#"{"Belege-Gruppe": [{"Signaturzertifikat": "!!!not-base64!!!", "Belege": []}]}"#;
        assert!(JsonDepParser::from_str(json).is_err());
    }
}
