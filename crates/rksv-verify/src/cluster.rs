//! # Cluster State Container
//!
//! [`ClusterState`] aggregates every register's [`CashRegisterState`]
//! alongside the cluster-wide set of used receipt ids. It is the unit
//! persisted between DEP runs and the unit [`crate::orchestrator`] extends.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use rksv_core::ReceiptId;

use crate::error::DepError;
use crate::state::{CashRegisterState, ClusterStart};

/// An ordered sequence of per-register states plus the cluster-wide used
/// receipt id set.
///
/// Serializes as the two-field document the persistence contract
/// specifies: `registers` and `used_receipt_ids`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterState {
    /// One entry per register, in the order registers were first seen.
    pub registers: Vec<CashRegisterState>,
    /// Every receipt id seen across every register in this cluster.
    pub used_receipt_ids: HashSet<ReceiptId>,
}

impl ClusterState {
    /// An empty cluster, with no registers and no receipts seen — the
    /// state the `state` CLI subcommand emits.
    pub fn new() -> Self {
        Self::default()
    }

    /// The index a new register would occupy if appended now.
    pub fn next_register_index(&self) -> usize {
        self.registers.len()
    }

    /// Append a freshly-initialized register, returning its index.
    pub fn push_register(&mut self) -> usize {
        self.registers.push(CashRegisterState::new());
        self.registers.len() - 1
    }

    /// The register at `index`, or `InvalidCashRegisterIndex` if out of
    /// range.
    pub fn register(&self, index: usize) -> Result<&CashRegisterState, DepError> {
        self.registers
            .get(index)
            .ok_or(DepError::InvalidCashRegisterIndex(index))
    }

    /// Mutable access to the register at `index`.
    pub fn register_mut(&mut self, index: usize) -> Result<&mut CashRegisterState, DepError> {
        self.registers
            .get_mut(index)
            .ok_or(DepError::InvalidCashRegisterIndex(index))
    }

    /// The last register's start receipt, packaged for seeding a new
    /// register's GGS cluster linkage — `NoStartReceiptForLastCashRegister`
    /// if the cluster has no registers yet or the last one has no start
    /// receipt recorded.
    pub fn last_cluster_start(&self) -> Result<ClusterStart, DepError> {
        self.registers
            .last()
            .and_then(CashRegisterState::as_cluster_start)
            .ok_or(DepError::NoStartReceiptForLastCashRegister)
    }

    /// Merge a per-chunk used-id set into the cluster-wide set, raising
    /// `DuplicateReceiptId` on the first collision found.
    ///
    /// Used by the parallel orchestrator to combine disjoint per-chunk
    /// results after workers complete — sequential callers can route
    /// through this too, but within one `verify_group` call duplicates are
    /// already caught receipt by receipt.
    pub fn merge_used_ids(
        &mut self,
        chunk_ids: HashSet<ReceiptId>,
    ) -> Result<(), crate::error::GroupError> {
        for id in chunk_ids {
            if !self.used_receipt_ids.insert(id.clone()) {
                return Err(crate::error::GroupError::DuplicateReceiptId(id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cluster_is_empty() {
        let cluster = ClusterState::new();
        assert!(cluster.registers.is_empty());
        assert!(cluster.used_receipt_ids.is_empty());
    }

    #[test]
    fn push_register_returns_sequential_indices() {
        let mut cluster = ClusterState::new();
        assert_eq!(cluster.push_register(), 0);
        assert_eq!(cluster.push_register(), 1);
        assert_eq!(cluster.next_register_index(), 2);
    }

    #[test]
    fn register_out_of_range_is_invalid_index() {
        let cluster = ClusterState::new();
        assert!(matches!(
            cluster.register(0),
            Err(DepError::InvalidCashRegisterIndex(0))
        ));
    }

    #[test]
    fn last_cluster_start_absent_without_registers() {
        let cluster = ClusterState::new();
        assert!(matches!(
            cluster.last_cluster_start(),
            Err(DepError::NoStartReceiptForLastCashRegister)
        ));
    }

    #[test]
    fn last_cluster_start_absent_before_initial_receipt() {
        let mut cluster = ClusterState::new();
        cluster.push_register();
        assert!(matches!(
            cluster.last_cluster_start(),
            Err(DepError::NoStartReceiptForLastCashRegister)
        ));
    }

    #[test]
    fn last_cluster_start_present_after_initial_receipt() {
        let mut cluster = ClusterState::new();
        cluster.push_register();
        {
            let reg = cluster.register_mut(0).unwrap();
            reg.start_receipt_jws = Some("header.payload.sig".to_string());
            reg.start_closed_system = Some(true);
        }
        let start = cluster.last_cluster_start().unwrap();
        assert_eq!(start.jws, "header.payload.sig");
        assert!(start.closed_system);
    }

    #[test]
    fn merge_used_ids_detects_cross_chunk_duplicates() {
        let mut cluster = ClusterState::new();
        cluster
            .merge_used_ids(HashSet::from([ReceiptId::new("0001")]))
            .unwrap();
        let result = cluster.merge_used_ids(HashSet::from([ReceiptId::new("0001")]));
        assert!(matches!(
            result,
            Err(crate::error::GroupError::DuplicateReceiptId(_))
        ));
    }
}
