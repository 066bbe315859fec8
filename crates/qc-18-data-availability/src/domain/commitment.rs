//! Share commitments
//!
//! A blob's commitment is the ordered combination of the roots of the
//! aligned power-of-two subtrees that exactly cover its shares. Clients
//! compute it from the blob alone ([`create_commitment`]); validators
//! recompute it from the data availability header and the blob's declared
//! position ([`get_commitment`]). The placement rule guarantees both
//! decompositions agree.

use super::block::Blob;
use super::header::DataAvailabilityHeader;
use super::namespace::NamespaceId;
use super::placement::next_lower_power_of_two;
use super::shares::BlobShareSplitter;
use crate::error::{DataAvailabilityError, Result};
use crate::ports::{SubtreeRootReader, TreeHasher};
use crate::Hash;

/// Descent from the original half of a row root to one subtree root.
/// `false` is left, `true` is right.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitPath {
    /// Row of the original square
    pub row: usize,
    /// Left/right steps below the original half of the row
    pub instructions: Vec<bool>,
}

/// Minimal aligned subtree decomposition of `share_count` shares starting
/// at `start` in a square of width `square_size` (a power of two).
pub fn calculate_commit_paths(
    square_size: usize,
    start: usize,
    share_count: usize,
) -> Vec<CommitPath> {
    if square_size == 0 {
        return Vec::new();
    }
    let levels = square_size.trailing_zeros();
    let mut paths = Vec::new();
    let mut cursor = start;
    let mut remaining = share_count;

    while remaining > 0 {
        let column = cursor % square_size;
        let mut width = if column == 0 {
            square_size
        } else {
            1usize << column.trailing_zeros()
        };
        while width > remaining {
            width /= 2;
        }

        let depth = levels - width.trailing_zeros();
        let position = column / width;
        paths.push(CommitPath {
            row: cursor / square_size,
            instructions: (0..depth).rev().map(|bit| (position >> bit) & 1 == 1).collect(),
        });

        cursor += width;
        remaining -= width;
    }
    paths
}

/// Recompute the commitment of the `share_count` shares at `start` from the
/// header's row trees.
pub fn get_commitment(
    reader: &dyn SubtreeRootReader,
    dah: &DataAvailabilityHeader,
    hasher: &dyn TreeHasher,
    start: usize,
    share_count: usize,
) -> Result<Hash> {
    let square_size = dah.square_size();
    let total = square_size * square_size;
    let end = start.saturating_add(share_count);
    if square_size == 0 || end > total {
        return Err(DataAvailabilityError::ShareRangeOutOfBounds { start, end, total });
    }

    let roots = calculate_commit_paths(square_size, start, share_count)
        .into_iter()
        .map(|path| {
            // step into the original (left) half of the extended row first
            let mut instructions = Vec::with_capacity(path.instructions.len() + 1);
            instructions.push(false);
            instructions.extend(path.instructions);
            reader.subtree_root(dah, path.row, &instructions)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(hasher.combine(&roots))
}

/// Commitment to `blob` as it would be laid out in a square of width
/// `square_size`: subtrees of the largest power of two `<= min(remaining,
/// square_size)` shares, left to right.
pub fn create_commitment(
    square_size: u64,
    namespace: NamespaceId,
    blob: &[u8],
    hasher: &dyn TreeHasher,
) -> Result<Hash> {
    let width_cap = usize::try_from(square_size)
        .ok()
        .filter(|&k| k > 0)
        .ok_or(DataAvailabilityError::InvalidSquareSize(square_size))?;

    let mut writer = BlobShareSplitter::new();
    writer.write(&Blob::new(namespace, blob.to_vec()))?;
    let leaves: Vec<Hash> = writer
        .export()
        .iter()
        .map(|share| hasher.hash_leaf(share.as_bytes()))
        .collect();

    let mut roots = Vec::new();
    let mut cursor = 0;
    while cursor < leaves.len() {
        let width = next_lower_power_of_two((leaves.len() - cursor).min(width_cap));
        roots.push(hasher.root_from_leaf_hashes(&leaves[cursor..cursor + width]));
        cursor += width;
    }
    Ok(hasher.combine(&roots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        EdsSubtreeRootCacher, MerkleHeaderBuilder, ReedSolomonExtender, Sha256TreeHasher,
    };
    use crate::domain::placement::blob_start_indices;
    use crate::domain::shares::{blob_shares_used, split};
    use crate::ports::{ErasureCoder, HeaderBuilder};
    use std::sync::Arc;

    fn path(row: usize, instructions: &[bool]) -> CommitPath {
        CommitPath {
            row,
            instructions: instructions.to_vec(),
        }
    }

    #[test]
    fn test_full_rows() {
        assert_eq!(
            calculate_commit_paths(4, 0, 8),
            vec![path(0, &[]), path(1, &[])]
        );
    }

    #[test]
    fn test_paths_within_row() {
        assert_eq!(
            calculate_commit_paths(8, 2, 5),
            vec![
                path(0, &[false, true]),
                path(0, &[true, false]),
                path(0, &[true, true, false]),
            ]
        );
    }

    #[test]
    fn test_paths_across_rows() {
        assert_eq!(
            calculate_commit_paths(4, 6, 6),
            vec![path(1, &[true]), path(2, &[])]
        );
        assert_eq!(
            calculate_commit_paths(4, 4, 5),
            vec![path(1, &[]), path(2, &[false, false])]
        );
    }

    #[test]
    fn test_zero_length_range_has_no_paths() {
        assert!(calculate_commit_paths(4, 3, 0).is_empty());
    }

    #[test]
    fn test_create_commitment_depends_on_square_size() {
        let hasher = Sha256TreeHasher;
        let ns = NamespaceId::new([3; 8]);
        let blob = vec![5u8; 248 * 6];
        let small = create_commitment(2, ns, &blob, &hasher).unwrap();
        let large = create_commitment(8, ns, &blob, &hasher).unwrap();
        assert_ne!(small, large);
        assert_eq!(small, create_commitment(2, ns, &blob, &hasher).unwrap());
        assert!(create_commitment(0, ns, &blob, &hasher).is_err());
    }

    #[test]
    fn test_get_commitment_out_of_range() {
        let hasher = Sha256TreeHasher;
        let shares = split(2, &[], &[], &[], &[]).unwrap();
        let eds = ReedSolomonExtender.extend(2, &shares).unwrap();
        let dah = MerkleHeaderBuilder::new(Arc::new(Sha256TreeHasher))
            .build(&eds)
            .unwrap();
        let reader = EdsSubtreeRootCacher::new(&eds, &hasher);
        assert!(matches!(
            get_commitment(&reader, &dah, &hasher, 3, 2),
            Err(DataAvailabilityError::ShareRangeOutOfBounds {
                start: 3,
                end: 5,
                total: 4
            })
        ));
    }

    #[test]
    fn test_commitments_match_placed_blobs() {
        let hasher = Sha256TreeHasher;
        let k = 16;
        let txs = vec![vec![1u8; 500]];
        let blobs: Vec<Blob> = [(2u8, 100usize), (3, 1500), (4, 248 * 20), (5, 700), (6, 3)]
            .iter()
            .map(|&(ns, len)| Blob::new(NamespaceId::new([ns; 8]), vec![ns; len]))
            .collect();
        let lens: Vec<usize> = blobs.iter().map(|b| b.shares_used()).collect();
        let (_, starts) = blob_start_indices(3, k, &lens);
        let indexes: Vec<u32> = starts.iter().map(|&s| s as u32).collect();

        let shares = split(k, &txs, &[], &blobs, &indexes).unwrap();
        let eds = ReedSolomonExtender.extend(k, &shares).unwrap();
        let dah = MerkleHeaderBuilder::new(Arc::new(Sha256TreeHasher))
            .build(&eds)
            .unwrap();
        let reader = EdsSubtreeRootCacher::new(&eds, &hasher);

        for (blob, &start) in blobs.iter().zip(&starts) {
            let expected =
                create_commitment(k as u64, blob.namespace, &blob.data, &hasher).unwrap();
            let actual = get_commitment(
                &reader,
                &dah,
                &hasher,
                start,
                blob_shares_used(blob.data.len()),
            )
            .unwrap();
            assert_eq!(actual, expected, "blob {} at {}", blob.namespace, start);
        }
    }
}
