//! Proposal block data

use super::malleation::extract_share_indexes;
use super::namespace::NamespaceId;
use super::shares::{blob_shares_used, split, Share};
use crate::error::Result;
use crate::utils::codec::{self, MAX_BLOCK_BYTES};
use crate::Hash;
use serde::{Deserialize, Serialize};

/// A namespaced payload stored in its own share run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// Namespace the blob is stored under
    pub namespace: NamespaceId,
    /// Payload bytes
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a blob
    pub fn new(namespace: NamespaceId, data: Vec<u8>) -> Self {
        Self { namespace, data }
    }

    /// Shares this blob occupies
    pub fn shares_used(&self) -> usize {
        blob_shares_used(self.data.len())
    }
}

/// Block data gossiped between validators.
///
/// `txs` keeps the proposer's transaction order with malleated payments
/// wrapped in place; `blobs` is in ascending namespace order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockData {
    /// Plain and malleated transactions
    pub txs: Vec<Vec<u8>>,
    /// Evidence items
    pub evidence: Vec<Vec<u8>>,
    /// Detached blobs
    pub blobs: Vec<Blob>,
    /// Width of the original square
    pub square_size: u64,
    /// Data root of the extended square
    pub hash: Hash,
}

impl BlockData {
    /// Encode to the gossip format
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self, MAX_BLOCK_BYTES)
    }

    /// Decode from the gossip format
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::decode(bytes, MAX_BLOCK_BYTES)
    }

    /// Re-derive the original square from the declared data, using the share
    /// indexes carried by the malleated transactions.
    pub fn shares(&self) -> Result<Vec<Share>> {
        let indexes = extract_share_indexes(&self.txs);
        split(
            self.square_size as usize,
            &self.txs,
            &self.evidence,
            &self.blobs,
            &indexes,
        )
    }
}
