//! # Identity Newtypes
//!
//! Domain-primitive newtypes for the identifiers that flow through the DEP
//! verification pipeline. Each identifier is a distinct type — you cannot
//! pass a [`RegisterId`] where a [`ReceiptId`] is expected.

use serde::{Deserialize, Serialize};

/// The cash register identifier (`Kassen-ID`) that owns a receipt group.
///
/// Opaque from the verifier's point of view: it is compared for equality
/// across receipts within a group, never parsed or interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterId(String);

impl RegisterId {
    /// Build a register identifier from its wire representation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the register identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The receipt identifier (`Belegnummer`), unique within a cluster once
/// deduplicated against `rksv-verify`'s `ClusterState::used_receipt_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptId(String);

impl ReceiptId {
    /// Build a receipt identifier from its wire representation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the receipt identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `zda` (Zertifizierungsdiensteanbieter) identifier naming the
/// certification service provider a certificate serial is scoped under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Zda(String);

impl Zda {
    /// Build a ZDA tag from its wire representation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the ZDA string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The distinguished tag (`"AT0"`) a receipt's own operator-tag field
    /// carries when its register belongs to a closed GGS cluster rather
    /// than an open, externally-ZDA-signed system.
    pub fn closed_system() -> Self {
        Self("AT0".to_string())
    }

    /// Whether this tag marks a closed GGS cluster register.
    pub fn is_closed_system(&self) -> bool {
        self.0 == "AT0"
    }
}

impl std::fmt::Display for Zda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A certificate serial number, scoped to a [`Zda`].
///
/// Two certificates with the same serial under the same ZDA but different
/// fingerprints indicate spoofing and must be rejected — see
/// `CertificateSerialCollision` in `rksv-verify`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertSerial(String);

impl CertSerial {
    /// Build a certificate serial from its wire representation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the serial string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CertSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A key store lookup key: the canonical `(zda, serial)` pair used to
/// resolve a certificate or public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId {
    zda: Zda,
    serial: CertSerial,
}

impl KeyId {
    /// Build a key id from its constituent ZDA and serial.
    pub fn new(zda: Zda, serial: CertSerial) -> Self {
        Self { zda, serial }
    }

    /// The certification service provider component.
    pub fn zda(&self) -> &Zda {
        &self.zda
    }

    /// The certificate serial component.
    pub fn serial(&self) -> &CertSerial {
        &self.serial
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.zda, self.serial)
    }
}
