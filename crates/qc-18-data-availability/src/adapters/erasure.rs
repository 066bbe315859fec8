//! Reed-Solomon square extension

use crate::domain::{ExtendedDataSquare, Share};
use crate::error::{DataAvailabilityError, Result};
use crate::ports::ErasureCoder;
use crate::SHARE_SIZE;
use reed_solomon_simd::ReedSolomonEncoder;

/// Extends every row of the original square with `k` parity shares, then
/// every one of the `2k` columns likewise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReedSolomonExtender;

fn coding_error(err: reed_solomon_simd::Error) -> DataAvailabilityError {
    DataAvailabilityError::ErasureCoding(err.to_string())
}

impl ReedSolomonExtender {
    fn parity(originals: &[&[u8]]) -> Result<Vec<Share>> {
        let mut encoder = ReedSolomonEncoder::new(originals.len(), originals.len(), SHARE_SIZE)
            .map_err(coding_error)?;
        for shard in originals {
            encoder.add_original_shard(shard).map_err(coding_error)?;
        }
        let encoded = encoder.encode().map_err(coding_error)?;
        encoded.recovery_iter().map(Share::from_bytes).collect()
    }
}

impl ErasureCoder for ReedSolomonExtender {
    fn extend(&self, square_size: usize, shares: &[Share]) -> Result<ExtendedDataSquare> {
        let k = square_size;
        if k == 0 || shares.len() != k * k {
            return Err(DataAvailabilityError::ErasureCoding(format!(
                "expected {} shares for a square of width {k}, got {}",
                k * k,
                shares.len()
            )));
        }
        let width = 2 * k;
        let mut grid = vec![Share::tail_padding(); width * width];

        for (row, originals) in shares.chunks(k).enumerate() {
            let refs: Vec<&[u8]> = originals.iter().map(|s| s.as_ref()).collect();
            let parity = Self::parity(&refs)?;
            for (col, share) in originals.iter().cloned().chain(parity).enumerate() {
                grid[row * width + col] = share;
            }
        }

        for col in 0..width {
            let refs: Vec<&[u8]> = (0..k).map(|row| grid[row * width + col].as_ref()).collect();
            let parity = Self::parity(&refs)?;
            for (i, share) in parity.into_iter().enumerate() {
                grid[(k + i) * width + col] = share;
            }
        }

        ExtendedDataSquare::new(width, grid)
    }
}
