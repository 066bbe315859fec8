//! Square size estimation
//!
//! Estimates err on the large side: every wire transaction is counted at its
//! full submitted size plus the malleation overhead, even though the payment
//! left after malleation is smaller.

use super::placement::{fits_in_square, is_power_of_two};
use super::shares::{blob_shares_used, delimited_len};
use super::transaction::ParsedTx;
use crate::config::DataSquareConfig;
use crate::TX_SHARE_CAPACITY;
use tracing::{debug, instrument};

/// Result of a square size estimate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquareEstimate {
    /// Chosen square width
    pub square_size: usize,
    /// Shares the candidate data is expected to use, padding excluded
    pub total_shares: usize,
}

impl SquareEstimate {
    /// Whether the estimated data exceeds the chosen square
    pub fn overflows(&self) -> bool {
        self.total_shares > self.square_size * self.square_size
    }
}

/// Contiguous share count (transactions then evidence) and the share length
/// of every blob in namespace order.
pub fn raw_share_count(
    txs: &[ParsedTx],
    evidence: &[Vec<u8>],
    malleated_tx_overhead: usize,
) -> (usize, Vec<usize>) {
    let mut tx_bytes = 0usize;
    let mut blobs = Vec::new();
    for tx in txs {
        match tx.wire_message() {
            None => tx_bytes += delimited_len(tx.raw().len()),
            Some(msg) => {
                tx_bytes += delimited_len(tx.raw().len() + malleated_tx_overhead);
                blobs.push((msg.namespace, blob_shares_used(msg.blob.len())));
            }
        }
    }
    let evidence_bytes: usize = evidence.iter().map(|e| delimited_len(e.len())).sum();

    // stable: equal namespaces keep submission order
    blobs.sort_by_key(|(namespace, _)| *namespace);

    let contiguous =
        tx_bytes.div_ceil(TX_SHARE_CAPACITY) + evidence_bytes.div_ceil(TX_SHARE_CAPACITY);
    (contiguous, blobs.into_iter().map(|(_, len)| len).collect())
}

/// Smallest power-of-two width whose square holds `shares` shares
fn smallest_square_for(shares: usize) -> usize {
    let mut k = 1usize;
    while k * k < shares {
        k <<= 1;
    }
    k
}

/// Estimate the square width for the candidate data.
///
/// Never fails: when nothing fits below the configured maximum the maximum
/// is returned and `total_shares` tells the caller how far over it is.
#[instrument(skip_all, fields(txs = txs.len(), evidence = evidence.len()))]
pub fn estimate_square_size(
    txs: &[ParsedTx],
    evidence: &[Vec<u8>],
    config: &DataSquareConfig,
) -> SquareEstimate {
    let (contiguous, blob_lens) = raw_share_count(txs, evidence, config.malleated_tx_overhead);
    let total_shares = contiguous + blob_lens.iter().sum::<usize>();

    let mut square_size = smallest_square_for(total_shares)
        .max(config.min_square_size)
        .min(config.max_square_size);
    loop {
        if square_size >= config.max_square_size {
            square_size = config.max_square_size;
            break;
        }
        if fits_in_square(contiguous, square_size, &blob_lens) {
            break;
        }
        square_size *= 2;
    }

    debug!(
        contiguous,
        blobs = blob_lens.len(),
        total_shares,
        "[qc-18] estimated square width {}",
        square_size
    );
    SquareEstimate {
        square_size,
        total_shares,
    }
}

/// Whether the candidate data fits a square of the configured maximum width
pub fn fits_max_square(
    txs: &[ParsedTx],
    evidence: &[Vec<u8>],
    config: &DataSquareConfig,
) -> bool {
    let (contiguous, blob_lens) = raw_share_count(txs, evidence, config.malleated_tx_overhead);
    fits_in_square(contiguous, config.max_square_size, &blob_lens)
}

/// Every configured square width a blob of `blob_size` bytes can occupy,
/// leaving at least one share for the transaction paying for it.
pub fn all_square_sizes(blob_size: usize, config: &DataSquareConfig) -> Vec<u64> {
    let shares = blob_shares_used(blob_size);
    let mut sizes = Vec::new();
    let mut k = config.min_square_size.max(1);
    if !is_power_of_two(k) {
        return sizes;
    }
    while k <= config.max_square_size {
        if shares < k * k {
            sizes.push(k as u64);
        }
        k *= 2;
    }
    sizes
}
