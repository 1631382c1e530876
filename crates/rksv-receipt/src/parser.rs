//! # DEP Parser Contract
//!
//! The verification engine consumes a DEP only through [`DepParser`]; it
//! never depends on a concrete file format. [`crate::JsonDepParser`]
//! supplies a runnable implementation against the real-world RKSV DEP JSON
//! shape.

use rksv_core::Zda;

/// One `Belege-Gruppe`: a ZDA-scoped certificate chain plus the receipts
/// to verify under it.
///
/// `certificate` is absent when the group's signing device failed to
/// attach one (or the DEP relies on a key-store lookup instead); whether
/// that is tolerated depends on how many groups share the enclosing
/// chunk — see `rksv-verify::orchestrator`.
#[derive(Debug, Clone)]
pub struct DepGroup {
    /// The certification service provider this group's certificate was
    /// issued under.
    pub zda: Zda,
    /// The signing certificate, DER-encoded.
    pub certificate: Option<Vec<u8>>,
    /// The issuer chain above `certificate`, up to (but not necessarily
    /// including) a trusted anchor.
    pub chain: Vec<Vec<u8>>,
    /// The compact JWS strings for this group's receipts, in file order.
    pub receipts: Vec<String>,
}

impl DepGroup {
    /// The leaf certificate followed by its issuer chain, the shape
    /// [`crate::parser`]'s consumers pass to certificate-chain
    /// verification.
    pub fn der_chain(&self) -> Vec<Vec<u8>> {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        if let Some(leaf) = &self.certificate {
            chain.push(leaf.clone());
        }
        chain.extend(self.chain.iter().cloned());
        chain
    }
}

/// A source of DEP chunks.
///
/// Implementations are free to read from a file, a network stream, or (as
/// in tests) an in-memory vector; the verification engine only calls
/// [`DepParser::next_chunk`] until it returns `None`. A chunk is a
/// non-empty ordered list of [`DepGroup`]s — `chunk_size` (receipts per
/// chunk, `0` for whole-file mode) governs how many groups a single chunk
/// may batch together, but never splits one group's receipts across two
/// chunks.
pub trait DepParser {
    /// The parser's error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the next chunk, or `None` once the DEP is exhausted.
    fn next_chunk(&mut self, chunk_size: usize) -> Result<Option<Vec<DepGroup>>, Self::Error>;
}
