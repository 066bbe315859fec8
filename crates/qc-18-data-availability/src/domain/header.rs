//! Extended data square and data availability header

use super::shares::Share;
use crate::error::{DataAvailabilityError, Result};
use crate::ports::TreeHasher;
use crate::Hash;
use serde::{Deserialize, Serialize};

/// A `2k x 2k` square: the original `k x k` quadrant plus parity, row-major
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedDataSquare {
    width: usize,
    shares: Vec<Share>,
}

impl ExtendedDataSquare {
    /// Wrap `width²` shares laid out row-major
    pub fn new(width: usize, shares: Vec<Share>) -> Result<Self> {
        if width == 0 || width % 2 != 0 || shares.len() != width * width {
            return Err(DataAvailabilityError::ErasureCoding(format!(
                "extended square of width {width} cannot hold {} shares",
                shares.len()
            )));
        }
        Ok(Self { width, shares })
    }

    /// Width of the extended square (`2k`)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Width of the original square (`k`)
    pub fn original_width(&self) -> usize {
        self.width / 2
    }

    /// Share at (`row`, `col`)
    pub fn share(&self, row: usize, col: usize) -> Option<&Share> {
        if row >= self.width || col >= self.width {
            return None;
        }
        self.shares.get(row * self.width + col)
    }

    /// All shares of `row`
    pub fn row(&self, row: usize) -> Option<&[Share]> {
        let start = row.checked_mul(self.width)?;
        self.shares.get(start..start + self.width)
    }

    /// All shares of `col`, top to bottom
    pub fn column(&self, col: usize) -> impl Iterator<Item = &Share> + '_ {
        self.shares
            .iter()
            .skip(col)
            .step_by(self.width)
            .take(if col < self.width { self.width } else { 0 })
    }

    /// Original `k x k` quadrant, row-major
    pub fn original_shares(&self) -> Vec<&Share> {
        let k = self.original_width();
        (0..k)
            .flat_map(|r| self.shares[r * self.width..r * self.width + k].iter())
            .collect()
    }
}

/// Row and column roots of an extended square
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAvailabilityHeader {
    /// Root of every extended row
    pub row_roots: Vec<Hash>,
    /// Root of every extended column
    pub column_roots: Vec<Hash>,
}

impl DataAvailabilityHeader {
    /// Create a header from its roots
    pub fn new(row_roots: Vec<Hash>, column_roots: Vec<Hash>) -> Self {
        Self {
            row_roots,
            column_roots,
        }
    }

    /// Width of the original square
    pub fn square_size(&self) -> usize {
        self.row_roots.len() / 2
    }

    /// Data root: row roots then column roots, combined in order
    pub fn hash(&self, hasher: &dyn TreeHasher) -> Hash {
        let roots: Vec<Hash> = self
            .row_roots
            .iter()
            .chain(self.column_roots.iter())
            .copied()
            .collect();
        hasher.combine(&roots)
    }
}
