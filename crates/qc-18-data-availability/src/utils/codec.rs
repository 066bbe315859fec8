//! Binary codec for transactions and block data
//!
//! Fixed-width integers, trailing bytes rejected, bounded allocation.

use crate::error::{DataAvailabilityError, Result};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Largest encoded transaction accepted: one full maximum-size square.
pub const MAX_TX_BYTES: u64 =
    (crate::MAX_SQUARE_SIZE * crate::MAX_SQUARE_SIZE * crate::SHARE_SIZE) as u64;

/// Largest encoded block data accepted.
pub const MAX_BLOCK_BYTES: u64 = 2 * MAX_TX_BYTES;

fn options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
        .with_limit(limit)
}

/// Encode `value` with a size limit
pub fn encode<T: Serialize>(value: &T, limit: u64) -> Result<Vec<u8>> {
    options(limit)
        .serialize(value)
        .map_err(|e| DataAvailabilityError::Encode(e.to_string()))
}

/// Decode a `T` that must consume all of `bytes`
///
/// bincode only enforces its limit on reader input, so slices are checked up
/// front.
pub fn decode<T: DeserializeOwned>(bytes: &[u8], limit: u64) -> Result<T> {
    if bytes.len() as u64 > limit {
        return Err(DataAvailabilityError::Decode(format!(
            "input of {} bytes exceeds limit of {} bytes",
            bytes.len(),
            limit
        )));
    }
    Ok(options(limit).deserialize(bytes)?)
}
