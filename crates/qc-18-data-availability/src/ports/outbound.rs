//! Outbound ports (driven side - SPI)
//!
//! Collaborators the square pipeline depends on but does not own: erasure
//! coding, merkle hashing, header construction, subtree root lookups and the
//! pruning policy applied when candidates overflow the largest square.

use crate::config::DataSquareConfig;
use crate::domain::{DataAvailabilityHeader, ExtendedDataSquare, ParsedTx, Share};
use crate::error::Result;
use crate::Hash;

/// Port: Erasure-extend an original square
pub trait ErasureCoder: Send + Sync {
    /// Extend `square_size²` original shares into a `2k x 2k` square.
    ///
    /// Must fail on a share count other than `square_size²`.
    fn extend(&self, square_size: usize, shares: &[Share]) -> Result<ExtendedDataSquare>;
}

/// Port: Binary merkle hashing
pub trait TreeHasher: Send + Sync {
    /// Hash of a leaf's data
    fn hash_leaf(&self, data: &[u8]) -> Hash;

    /// Hash of an inner node
    fn hash_node(&self, left: &Hash, right: &Hash) -> Hash;

    /// Root of an empty tree
    fn empty_root(&self) -> Hash;

    /// Root over already-hashed leaves. Splits at the largest power of two
    /// below the leaf count, so power-of-two ranges form perfect subtrees.
    fn root_from_leaf_hashes(&self, leaves: &[Hash]) -> Hash {
        match leaves.len() {
            0 => self.empty_root(),
            1 => leaves[0],
            n => {
                let split = n.next_power_of_two() / 2;
                let left = self.root_from_leaf_hashes(&leaves[..split]);
                let right = self.root_from_leaf_hashes(&leaves[split..]);
                self.hash_node(&left, &right)
            }
        }
    }

    /// Order-sensitive combination of hashes into one
    fn combine(&self, items: &[Hash]) -> Hash {
        let leaves: Vec<Hash> = items.iter().map(|item| self.hash_leaf(item)).collect();
        self.root_from_leaf_hashes(&leaves)
    }
}

/// Port: Row and column roots of an extended square
pub trait HeaderBuilder: Send + Sync {
    /// Build the header for `eds`
    fn build(&self, eds: &ExtendedDataSquare) -> Result<DataAvailabilityHeader>;
}

/// Port: Subtree roots inside extended rows
///
/// Scoped to a single prepare or validate call.
pub trait SubtreeRootReader {
    /// Root of the node reached from the root of `row` by following `path`
    /// (`false` left, `true` right)
    fn subtree_root(&self, dah: &DataAvailabilityHeader, row: usize, path: &[bool])
        -> Result<Hash>;
}

/// Port: Drop candidates until the rest fits the largest square
pub trait PruningPolicy: Send + Sync {
    /// Return the retained candidates, in their original order
    fn prune(
        &self,
        txs: Vec<ParsedTx>,
        evidence: &[Vec<u8>],
        config: &DataSquareConfig,
    ) -> Vec<ParsedTx>;
}
