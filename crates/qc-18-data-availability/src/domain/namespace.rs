//! Namespace identifiers
//!
//! Every share starts with an 8-byte namespace. Shares are globally ordered
//! by namespace: reserved namespaces (transactions, evidence, padding) sort
//! below user blobs, tail padding and parity sort above them.

use crate::error::{DataAvailabilityError, Result};
use crate::NAMESPACE_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-byte namespace identifier, ordered lexicographically
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NamespaceId(pub [u8; NAMESPACE_SIZE]);

impl NamespaceId {
    /// Namespace of contiguous transaction shares
    pub const TRANSACTIONS: NamespaceId = NamespaceId([0, 0, 0, 0, 0, 0, 0, 1]);

    /// Namespace of intermediate state root shares
    pub const INTERMEDIATE_STATE_ROOTS: NamespaceId = NamespaceId([0, 0, 0, 0, 0, 0, 0, 2]);

    /// Namespace of contiguous evidence shares
    pub const EVIDENCE: NamespaceId = NamespaceId([0, 0, 0, 0, 0, 0, 0, 3]);

    /// Highest reserved namespace; also used for padding ahead of the first blob
    pub const MAX_RESERVED: NamespaceId = NamespaceId([0, 0, 0, 0, 0, 0, 0, 255]);

    /// Namespace of the padding that fills the square after the last blob
    pub const TAIL_PADDING: NamespaceId =
        NamespaceId([0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);

    /// Namespace of erasure-coded parity shares
    pub const PARITY: NamespaceId = NamespaceId([0xFF; NAMESPACE_SIZE]);

    /// Create a namespace from raw bytes
    pub const fn new(bytes: [u8; NAMESPACE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse a namespace from a byte slice of exactly `NAMESPACE_SIZE` bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; NAMESPACE_SIZE] =
            bytes
                .try_into()
                .map_err(|_| DataAvailabilityError::InvalidNamespaceLength {
                    expected: NAMESPACE_SIZE,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Raw namespace bytes
    pub fn as_bytes(&self) -> &[u8; NAMESPACE_SIZE] {
        &self.0
    }

    /// Reserved namespaces may never carry user blobs.
    pub fn is_reserved(&self) -> bool {
        *self <= Self::MAX_RESERVED || *self == Self::TAIL_PADDING || *self == Self::PARITY
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamespaceId({})", hex::encode(self.0))
    }
}

impl From<[u8; NAMESPACE_SIZE]> for NamespaceId {
    fn from(bytes: [u8; NAMESPACE_SIZE]) -> Self {
        Self(bytes)
    }
}
