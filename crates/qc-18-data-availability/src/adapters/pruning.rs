//! Tail pruning
//!
//! Candidates arrive in priority order, so the lowest-priority entries sit at
//! the tail. The retained set is the longest prefix that still fits a square
//! of the configured maximum width.

use crate::config::DataSquareConfig;
use crate::domain::{fits_max_square, ParsedTx};
use crate::ports::PruningPolicy;
use tracing::warn;

/// Drops candidates from the tail until the rest fits
#[derive(Clone, Copy, Debug, Default)]
pub struct TailPruner;

impl PruningPolicy for TailPruner {
    fn prune(
        &self,
        mut txs: Vec<ParsedTx>,
        evidence: &[Vec<u8>],
        config: &DataSquareConfig,
    ) -> Vec<ParsedTx> {
        if fits_max_square(&txs, evidence, config) {
            return txs;
        }

        // fitting is monotone in prefix length: `lo` fits (or is empty), `hi` does not
        let (mut lo, mut hi) = (0usize, txs.len());
        while lo + 1 < hi {
            let mid = lo + (hi - lo) / 2;
            if fits_max_square(&txs[..mid], evidence, config) {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        warn!(
            kept = lo,
            dropped = txs.len() - lo,
            "[qc-18] Pruned candidates to fit a square of width {}",
            config.max_square_size
        );
        txs.truncate(lo);
        txs
    }
}
