//! SHA-256 binary merkle hashing and header construction
//!
//! Leaves and inner nodes are domain-separated (`0x00` / `0x01` prefixes,
//! RFC 6962 style) so a leaf can never be confused with an inner node.

use crate::domain::{DataAvailabilityHeader, ExtendedDataSquare, Share};
use crate::error::{DataAvailabilityError, Result};
use crate::ports::{HeaderBuilder, TreeHasher};
use crate::utils::{sha256, sha256_prefixed};
use crate::Hash;
use std::sync::Arc;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Default tree hasher
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256TreeHasher;

impl TreeHasher for Sha256TreeHasher {
    fn hash_leaf(&self, data: &[u8]) -> Hash {
        sha256_prefixed(LEAF_PREFIX, &[data])
    }

    fn hash_node(&self, left: &Hash, right: &Hash) -> Hash {
        sha256_prefixed(NODE_PREFIX, &[left, right])
    }

    fn empty_root(&self) -> Hash {
        sha256(&[])
    }
}

/// Builds row and column roots with a [`TreeHasher`]
#[derive(Clone)]
pub struct MerkleHeaderBuilder {
    hasher: Arc<dyn TreeHasher>,
}

impl MerkleHeaderBuilder {
    /// Create a builder over `hasher`
    pub fn new(hasher: Arc<dyn TreeHasher>) -> Self {
        Self { hasher }
    }

    fn root<'a>(&self, shares: impl Iterator<Item = &'a Share>) -> Hash {
        let leaves: Vec<Hash> = shares.map(|s| self.hasher.hash_leaf(s.as_bytes())).collect();
        self.hasher.root_from_leaf_hashes(&leaves)
    }
}

impl HeaderBuilder for MerkleHeaderBuilder {
    fn build(&self, eds: &ExtendedDataSquare) -> Result<DataAvailabilityHeader> {
        let width = eds.width();
        let row_roots = (0..width)
            .map(|r| {
                eds.row(r)
                    .map(|row| self.root(row.iter()))
                    .ok_or_else(|| DataAvailabilityError::ErasureCoding(format!("missing row {r}")))
            })
            .collect::<Result<Vec<_>>>()?;
        let column_roots = (0..width).map(|c| self.root(eds.column(c))).collect();
        Ok(DataAvailabilityHeader::new(row_roots, column_roots))
    }
}
