//! # Per-Register State Machine
//!
//! [`verify_group`] walks one register's receipts in file order, enforcing
//! every invariant the regulation places on a single cash register: the
//! initial (null) receipt's shape and chaining, restore-receipt discipline
//! after a signing-device failure, receipt-id uniqueness across the whole
//! cluster, and turnover-counter reconciliation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use rksv_algorithm::AlgorithmRegistry;
use rksv_core::{ReceiptId, RegisterId, Zda};
use rksv_receipt::Receipt;

use crate::error::{GroupError, VerifyError};
use crate::receipt_verifier::{ReceiptVerifier, SingleVerifyOutcome};

/// The previous register's start receipt, carried across [`verify_group`]
/// calls to seed a new register's GGS cluster linkage.
///
/// Only ever constructed from a register's own recorded
/// [`CashRegisterState::start_receipt_jws`]/`start_closed_system` pair —
/// see `rksv-verify::cluster`.
#[derive(Debug, Clone)]
pub struct ClusterStart {
    /// The prior register's first receipt, as a compact JWS string.
    pub jws: String,
    /// Whether the prior register's first receipt declared the `"AT0"`
    /// closed-system operator tag.
    pub closed_system: bool,
}

/// The persisted state of a single cash register, updated receipt by
/// receipt as a group is verified.
///
/// Serializes directly — this *is* the wire shape for one entry in the
/// cluster state persistence document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CashRegisterState {
    /// The register id, once its initial receipt has been seen.
    pub register_id: Option<RegisterId>,
    /// Whether this register belongs to a closed GGS cluster (its receipts'
    /// `zda` operator tag is `"AT0"`), once its initial receipt has been
    /// seen.
    pub closed_system: Option<bool>,
    /// The running turnover counter, in hundredths of the currency unit.
    pub turnover_counter: i64,
    /// The most recently verified receipt's full JWS string, used to
    /// compute the next receipt's expected chaining value.
    pub last_jws: Option<String>,
    /// The most recently verified receipt's id.
    pub last_receipt_id: Option<ReceiptId>,
    /// The register's very first (null) receipt's JWS string, used for
    /// GGS cluster linkage between registers.
    pub start_receipt_jws: Option<String>,
    /// Whether the register's first receipt declared the closed-system
    /// operator tag — carried alongside `start_receipt_jws` so the cluster
    /// orchestrator can seed the next register's [`ClusterStart`] without
    /// re-parsing a JWS string.
    pub start_closed_system: Option<bool>,
    /// Set once a non-null receipt is produced right after a receipt whose
    /// signing device had failed; cleared by the next null receipt.
    /// Seeing a second non-null receipt while this is set is the
    /// violation `NoRestoreReceiptAfterSignatureSystemFailure` reports.
    pub need_restore_receipt: bool,
    /// Whether the most recently processed receipt carried no signature
    /// (the signing device had failed when it was produced).
    pub last_receipt_was_broken: bool,
}

impl CashRegisterState {
    /// A fresh, empty register state (no receipts processed yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this register's initial receipt has already been
    /// processed.
    pub fn is_initialized(&self) -> bool {
        self.last_jws.is_some()
    }

    /// This register's start receipt, packaged as a [`ClusterStart`] for
    /// seeding the next register in the cluster — `None` until the
    /// initial receipt has been processed.
    pub fn as_cluster_start(&self) -> Option<ClusterStart> {
        Some(ClusterStart {
            jws: self.start_receipt_jws.clone()?,
            closed_system: self.start_closed_system?,
        })
    }
}

/// Verify one chunk of a single register's receipts against its running
/// state, updating `state` and `used_receipt_ids` in place.
///
/// `prev_cluster_start` carries the GGS cluster linkage: the previous
/// register's start receipt, used in place of `SHA256(register_id)` when
/// checking *this* register's initial receipt's chaining value, and its
/// closed-system flag, checked against this receipt's own operator tag.
#[allow(clippy::too_many_arguments)]
pub fn verify_group(
    receipts: &[Receipt],
    state: &mut CashRegisterState,
    used_receipt_ids: &mut HashSet<ReceiptId>,
    verifier: &ReceiptVerifier<'_>,
    cert_zda: &Zda,
    registry: &AlgorithmRegistry,
    turnover_key: Option<&[u8]>,
    prev_cluster_start: Option<&ClusterStart>,
) -> Result<(), VerifyError> {
    for receipt in receipts {
        let receipt_id = receipt.receipt_id().clone();

        // Step 1: parse (already done by the caller) and verify the
        // signature. `SignatureSystemFailed` and `UnsignedNull` are
        // tolerated outcomes the remaining steps handle explicitly; any
        // other error is fatal.
        let outcome = verifier.verify(receipt, cert_zda, registry);
        if let SingleVerifyOutcome::Error(e) = outcome {
            return Err(e.into());
        }
        if matches!(outcome, SingleVerifyOutcome::SignatureSystemFailed) {
            tracing::warn!(receipt_id = %receipt_id, "signature system failure tolerated");
        }

        // Receipt ids are unique across the whole cluster, including a
        // register's own initial receipt.
        if !used_receipt_ids.insert(receipt_id.clone()) {
            return Err(GroupError::DuplicateReceiptId(receipt_id).into());
        }

        if !state.is_initialized() {
            verify_initial_receipt(receipt, &outcome, prev_cluster_start, registry)?;

            state.register_id = Some(receipt.register_id().clone());
            state.closed_system = Some(receipt.zda().is_closed_system());
            state.turnover_counter = 0;
            state.last_jws = Some(receipt.jws().to_string());
            state.last_receipt_id = Some(receipt_id);
            state.start_receipt_jws = Some(receipt.jws().to_string());
            state.start_closed_system = Some(receipt.zda().is_closed_system());
            state.need_restore_receipt = false;
            state.last_receipt_was_broken = matches!(outcome, SingleVerifyOutcome::SignatureSystemFailed);
            continue;
        }

        // Restore-receipt discipline, checked before the cross-receipt
        // invariants below so a pending restore obligation always takes
        // priority over e.g. a register-id change on the same receipt.
        if receipt.is_null() {
            if state.need_restore_receipt {
                tracing::debug!(receipt_id = %receipt_id, "restore receipt consumed");
            }
            state.need_restore_receipt = false;
        } else {
            if state.need_restore_receipt {
                return Err(
                    GroupError::NoRestoreReceiptAfterSignatureSystemFailure(receipt_id.clone())
                        .into(),
                );
            }
            if state.last_receipt_was_broken {
                state.need_restore_receipt = true;
            }
        }

        // Cross-receipt invariants.
        if let Some(expected) = &state.register_id {
            if expected != receipt.register_id() {
                return Err(GroupError::ChangingRegisterId {
                    expected: expected.clone(),
                    actual: receipt.register_id().clone(),
                }
                .into());
            }
        }
        if let Some(expected_closed) = state.closed_system {
            if expected_closed != receipt.zda().is_closed_system() {
                return Err(GroupError::ChangingSystemType {
                    expected: expected_closed,
                    actual: receipt.zda().is_closed_system(),
                    receipt_id: receipt_id.clone(),
                }
                .into());
            }
        }
        // The regulation's date-monotonicity check is deliberately not
        // enforced here — a regulatory erratum exempts it.

        // Chain check.
        let algorithm = registry
            .get(receipt.algorithm_prefix())
            .map_err(crate::error::ReceiptVerifyError::Algorithm)?;
        let expected_chain = algorithm.chain(receipt.register_id().as_str(), state.last_jws.as_deref());
        if receipt.previous_chain() != Some(expected_chain.as_slice()) {
            return Err(GroupError::Chaining {
                receipt_id: receipt_id.clone(),
                prior_jws: state.last_jws.clone(),
            }
            .into());
        }

        reconcile_turnover(receipt, state, turnover_key, algorithm)?;

        state.last_jws = Some(receipt.jws().to_string());
        state.last_receipt_id = Some(receipt_id);
        state.last_receipt_was_broken = matches!(outcome, SingleVerifyOutcome::SignatureSystemFailed);
    }

    Ok(())
}

fn verify_initial_receipt(
    receipt: &Receipt,
    outcome: &SingleVerifyOutcome,
    prev_cluster_start: Option<&ClusterStart>,
    registry: &AlgorithmRegistry,
) -> Result<(), VerifyError> {
    let receipt_id = receipt.receipt_id().clone();

    // A register's very first receipt must be properly signed: both
    // tolerated-unsigned outcomes (the device's signing hardware had
    // failed, or the receipt was an explicitly-unsigned null) escalate
    // here, since there is no prior receipt to fall back on.
    if matches!(
        outcome,
        SingleVerifyOutcome::SignatureSystemFailed | SingleVerifyOutcome::UnsignedNull
    ) {
        return Err(GroupError::SignatureSystemFailedOnInitialReceipt(receipt_id).into());
    }

    if !receipt.sums_are_zero() {
        return Err(GroupError::NonzeroTurnoverOnInitialReceipt(receipt_id).into());
    }
    if receipt.is_dummy() || receipt.is_reversal() {
        return Err(GroupError::NonstandardTypeOnInitialReceipt(receipt_id).into());
    }

    let algorithm = registry
        .get(receipt.algorithm_prefix())
        .map_err(crate::error::ReceiptVerifyError::Algorithm)?;

    match prev_cluster_start {
        Some(prev) => {
            // GGS cluster linkage: both this register's and the prior
            // register's operator tags must mark the closed system, and
            // this receipt's chain value is checked against the prior
            // register's start receipt rather than `SHA256(register_id)`.
            if !receipt.zda().is_closed_system() || !prev.closed_system {
                return Err(GroupError::ClusterInOpenSystem.into());
            }
            let expected = algorithm.chain(receipt.register_id().as_str(), Some(prev.jws.as_str()));
            if receipt.previous_chain() != Some(expected.as_slice()) {
                return Err(GroupError::InvalidChainingOnClusterInitialReceipt(receipt_id).into());
            }
        }
        None => {
            let expected = algorithm.chain(receipt.register_id().as_str(), None);
            if receipt.previous_chain() != Some(expected.as_slice()) {
                return Err(GroupError::InvalidChainingOnInitialReceipt(receipt_id).into());
            }
        }
    }

    Ok(())
}

fn reconcile_turnover(
    receipt: &Receipt,
    state: &mut CashRegisterState,
    turnover_key: Option<&[u8]>,
    algorithm: &dyn rksv_algorithm::Algorithm,
) -> Result<(), VerifyError> {
    use rksv_receipt::TurnoverCounterField;

    if receipt.is_dummy() {
        return Ok(());
    }

    let sum_total: i64 = receipt.sums().iter().map(|s| s.as_cents()).sum();

    if receipt.is_reversal() {
        state.turnover_counter = state.turnover_counter.saturating_add(sum_total);
        return Ok(());
    }

    let expected = state.turnover_counter.saturating_add(sum_total);

    if let (TurnoverCounterField::Encrypted(ciphertext), Some(key)) =
        (receipt.turnover(), turnover_key)
    {
        let actual = algorithm
            .decrypt_turnover_counter(
                key,
                receipt.register_id().as_str(),
                receipt.receipt_id().as_str(),
                ciphertext,
            )
            .map_err(|_| GroupError::InvalidTurnoverCounter(receipt.receipt_id().clone()))?;
        if actual != expected {
            return Err(GroupError::InvalidTurnoverCounter(receipt.receipt_id().clone()).into());
        }
    }

    state.turnover_counter = expected;
    Ok(())
}
