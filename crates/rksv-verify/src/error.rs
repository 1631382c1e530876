//! # Verification Error Taxonomy
//!
//! A closed set of error conditions, split by scope: [`ReceiptVerifyError`]
//! for the single-receipt verifier, [`GroupError`] for conditions detected
//! while walking one register's receipts, and [`DepError`] for conditions
//! that only make sense across the whole DEP (certificate trust, cluster
//! structure). [`VerifyError`] aggregates all three for callers that don't
//! need to distinguish them.

use rksv_core::{CertSerial, ReceiptId, RegisterId};
use thiserror::Error;

/// Errors from verifying a single receipt's signature.
#[derive(Error, Debug)]
pub enum ReceiptVerifyError {
    /// The receipt named a certificate serial that does not match the
    /// certificate it is being checked against.
    #[error("receipt {receipt_id} names certificate serial \"{named}\", but was checked against \"{actual}\"")]
    CertificateSerialMismatch {
        /// The receipt in question.
        receipt_id: ReceiptId,
        /// The serial the receipt named.
        named: String,
        /// The serial of the certificate actually used.
        actual: String,
    },

    /// No public key was available to verify against (key store lookup
    /// miss).
    #[error("no public key available for receipt {0}")]
    NoPublicKeyAvailable(ReceiptId),

    /// The receipt failed to parse from its JWS string.
    #[error(transparent)]
    Parse(#[from] rksv_receipt::ReceiptParseError),

    /// The algorithm layer rejected the signature.
    #[error(transparent)]
    Algorithm(#[from] rksv_algorithm::AlgorithmError),
}

/// Errors detected while walking one register's receipts
/// ([`crate::state::verify_group`]).
#[derive(Error, Debug)]
pub enum GroupError {
    /// A receipt's chaining value does not match the hash of the previous
    /// receipt.
    #[error("chaining mismatch at receipt {receipt_id}")]
    Chaining {
        /// The receipt whose chain value failed to verify.
        receipt_id: ReceiptId,
        /// The prior receipt's JWS the chain value was checked against, if
        /// any (`None` would mean this receipt was treated as initial).
        prior_jws: Option<String>,
    },

    /// A receipt id was seen more than once in the cluster.
    #[error("duplicate receipt id: {0}")]
    DuplicateReceiptId(ReceiptId),

    /// The decrypted turnover counter is not the expected running total.
    #[error("invalid turnover counter at receipt {0}")]
    InvalidTurnoverCounter(ReceiptId),

    /// A register's id changed mid-group.
    #[error("register id changed from {expected} to {actual}")]
    ChangingRegisterId {
        /// The register id established by earlier receipts in the group.
        expected: RegisterId,
        /// The register id the offending receipt declared.
        actual: RegisterId,
    },

    /// A register's operator-tag class (closed GGS system vs. open,
    /// externally-ZDA-signed system) changed mid-group.
    #[error("operator tag class changed from {expected} to {actual} at receipt {receipt_id}")]
    ChangingSystemType {
        /// Whether earlier receipts in the group declared the closed
        /// (`"AT0"`) system.
        expected: bool,
        /// Whether the offending receipt declared the closed system.
        actual: bool,
        /// The offending receipt.
        receipt_id: ReceiptId,
    },

    /// A register's turnover counter encoding size changed mid-group.
    ///
    /// Declared for taxonomy completeness but never raised by this
    /// implementation — see `DESIGN.md`.
    #[error("turnover counter size changed for register {0}")]
    ChangingTurnoverCounterSize(RegisterId),

    /// A register's first receipt declared a nonzero turnover.
    #[error("nonzero turnover on initial receipt {0}")]
    NonzeroTurnoverOnInitialReceipt(ReceiptId),

    /// A register's first receipt was not a plain null receipt (it was a
    /// dummy or reversal receipt).
    #[error("initial receipt {0} is not a standard null receipt")]
    NonstandardTypeOnInitialReceipt(ReceiptId),

    /// A register's first receipt's chaining value did not match
    /// `SHA256(register_id)`.
    #[error("initial receipt {0} has invalid chaining value")]
    InvalidChainingOnInitialReceipt(ReceiptId),

    /// The cluster's first-ever receipt's chaining value did not match
    /// `SHA256("AT0")`.
    #[error("cluster-initial receipt {0} has invalid chaining value")]
    InvalidChainingOnClusterInitialReceipt(ReceiptId),

    /// A register's first receipt was produced while the signing device
    /// had already failed.
    #[error("signature system failed on initial receipt {0}")]
    SignatureSystemFailedOnInitialReceipt(ReceiptId),

    /// A signed receipt followed a run of signature-system-failure
    /// receipts without an intervening null restore receipt.
    #[error("no restore receipt after signature system failure before receipt {0}")]
    NoRestoreReceiptAfterSignatureSystemFailure(ReceiptId),
}

/// Errors that only make sense across the whole DEP.
#[derive(Error, Debug)]
pub enum DepError {
    /// A cluster (multiple registers) was verified as if it were a single
    /// open (non-clustered) system.
    #[error("cluster verified as an open system")]
    ClusterInOpenSystem,

    /// A chunk spans more than one `Belege-Gruppe` but no per-group
    /// certificate was supplied.
    #[error("no certificate given for a multi-group chunk")]
    NoCertificateGiven,

    /// A certificate's chain does not terminate at a trusted anchor.
    #[error("untrusted certificate: {0}")]
    UntrustedCertificate(CertSerial),

    /// Two certificates share a serial under the same ZDA but have
    /// different fingerprints.
    #[error("certificate serial collision: {0}")]
    CertificateSerialCollision(CertSerial),

    /// A certificate in the chain was not signed by the next certificate
    /// up.
    #[error("certificate chain broken between {leaf} and {signer}")]
    CertificateChainBroken {
        /// The certificate whose signature did not verify.
        leaf: CertSerial,
        /// The certificate that was supposed to have signed it.
        signer: CertSerial,
    },

    /// A `--continue` index named a register that does not exist in the
    /// prior state.
    #[error("invalid cash register index: {0}")]
    InvalidCashRegisterIndex(usize),

    /// `--continue` was requested but the prior state has no last
    /// register to continue.
    #[error("no start receipt recorded for the last cash register")]
    NoStartReceiptForLastCashRegister,
}

/// Aggregated verification error.
///
/// Most call sites only need to know verification failed and why; they
/// use this type. Call sites that branch on the specific condition (the
/// CLI's exit-code mapping, tests) match on the wrapped variant.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// A single-receipt signature check failed outright (not one of the
    /// two tolerated sub-cases).
    #[error(transparent)]
    Receipt(#[from] ReceiptVerifyError),

    /// A receipt-scoped invariant was violated.
    #[error(transparent)]
    Group(#[from] GroupError),

    /// A DEP-scoped invariant was violated.
    #[error(transparent)]
    Dep(#[from] DepError),

    /// The DEP parser itself failed.
    #[error("DEP parse error: {0}")]
    Parser(String),
}
