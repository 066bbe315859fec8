//! Configuration for square construction

use crate::domain::placement::is_power_of_two;
use crate::error::{DataAvailabilityError, Result};
use serde::Deserialize;
use std::env;

/// Runtime configuration for data square construction
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataSquareConfig {
    /// Smallest square width the estimator may return
    pub min_square_size: usize,

    /// Largest square width the estimator may return
    pub max_square_size: usize,

    /// Bytes added to every wire transaction when estimating its malleated size
    pub malleated_tx_overhead: usize,
}

impl Default for DataSquareConfig {
    fn default() -> Self {
        Self {
            min_square_size: crate::MIN_SQUARE_SIZE,
            max_square_size: crate::MAX_SQUARE_SIZE,
            malleated_tx_overhead: crate::MALLEATED_TX_OVERHEAD,
        }
    }
}

impl DataSquareConfig {
    /// Build from `QC_DA_*` environment variables, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_square_size: env::var("QC_DA_MIN_SQUARE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_square_size),

            max_square_size: env::var("QC_DA_MAX_SQUARE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_square_size),

            malleated_tx_overhead: env::var("QC_DA_MALLEATED_TX_OVERHEAD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.malleated_tx_overhead),
        }
    }

    /// Check bounds: both limits are powers of two within the protocol range
    /// and `min <= max`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_square_size", self.min_square_size),
            ("max_square_size", self.max_square_size),
        ] {
            if !is_power_of_two(value) {
                return Err(DataAvailabilityError::InvalidConfig(format!(
                    "{name} must be a power of two, got {value}"
                )));
            }
            if !(crate::MIN_SQUARE_SIZE..=crate::MAX_SQUARE_SIZE).contains(&value) {
                return Err(DataAvailabilityError::InvalidConfig(format!(
                    "{name} must be within [{}, {}], got {value}",
                    crate::MIN_SQUARE_SIZE,
                    crate::MAX_SQUARE_SIZE
                )));
            }
        }
        if self.min_square_size > self.max_square_size {
            return Err(DataAvailabilityError::InvalidConfig(format!(
                "min_square_size {} exceeds max_square_size {}",
                self.min_square_size, self.max_square_size
            )));
        }
        Ok(())
    }

    /// Whether `square_size` is a width this configuration permits.
    pub fn is_valid_square_size(&self, square_size: u64) -> bool {
        usize::try_from(square_size)
            .map(|k| {
                is_power_of_two(k) && k >= self.min_square_size && k <= self.max_square_size
            })
            .unwrap_or(false)
    }
}
