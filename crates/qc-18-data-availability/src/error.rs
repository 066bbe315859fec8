//! Error types for the data availability subsystem

use crate::domain::NamespaceId;
use thiserror::Error;

/// Result type alias for data availability operations
pub type Result<T> = std::result::Result<T, DataAvailabilityError>;

/// Errors that can occur while building or validating a data square
#[derive(Debug, Error)]
pub enum DataAvailabilityError {
    /// Transaction, evidence or block bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Encoding a value into its wire form failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Transaction failed basic structural validation
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Wire blob message failed basic structural validation
    #[error("Invalid blob message: {0}")]
    InvalidBlobMessage(String),

    /// Blob submitted under a reserved namespace
    #[error("Namespace {0} is reserved")]
    ReservedNamespace(NamespaceId),

    /// Namespace byte string has the wrong length
    #[error("Invalid namespace length: expected {expected}, got {actual}")]
    InvalidNamespaceLength {
        /// Expected length
        expected: usize,
        /// Provided length
        actual: usize,
    },

    /// Malleation requested for a transaction without a wire blob
    #[error("Transaction does not carry a wire blob")]
    NotWireBlob,

    /// Wire message has no commitment for the chosen square size
    #[error("No share commitment for square size {square_size}")]
    MissingCommitment {
        /// Square size that was requested
        square_size: u64,
    },

    /// Number of declared blob indexes differs from the number of blobs
    #[error("Number of share indexes ({indexes}) does not match number of blobs ({blobs})")]
    IncorrectNumberOfIndexes {
        /// Declared share indexes
        indexes: usize,
        /// Declared blobs
        blobs: usize,
    },

    /// First blob does not start where the contiguous data ends
    #[error("First blob starts at unexpected share index: expected {expected}, got {actual}")]
    UnexpectedFirstBlobShareIndex {
        /// Index derived from the placement rule
        expected: u32,
        /// Declared index
        actual: u32,
    },

    /// A later blob does not start at its placement-rule index
    #[error("Blob {position} starts at unexpected share index: expected {expected}, got {actual}")]
    UnexpectedBlobShareIndex {
        /// Position of the blob in namespace order
        position: usize,
        /// Index derived from the placement rule
        expected: u32,
        /// Declared index
        actual: u32,
    },

    /// Blobs are not sorted by namespace
    #[error("Blobs are not in ascending namespace order at position {position}")]
    BlobsOutOfOrder {
        /// Position of the first out-of-order blob
        position: usize,
    },

    /// Layout needs more shares than the square holds
    #[error("Square overflow: {used} shares do not fit in a {square_size}x{square_size} square")]
    SquareOverflow {
        /// Shares required
        used: usize,
        /// Square width
        square_size: usize,
    },

    /// Square width is not a permitted power of two
    #[error("Invalid square size: {0}")]
    InvalidSquareSize(u64),

    /// Commitment requested for a range outside the square
    #[error("Share range {start}..{end} is outside a square of {total} shares")]
    ShareRangeOutOfBounds {
        /// First share of the range
        start: usize,
        /// One past the last share of the range
        end: usize,
        /// Shares in the original square
        total: usize,
    },

    /// Recomputed commitment differs from the declared one
    #[error("Commitment mismatch for blob at share index {share_index}")]
    CommitmentMismatch {
        /// Share index of the blob
        share_index: u32,
    },

    /// Recomputed data root differs from the declared one
    #[error("Data root mismatch: declared {declared}, computed {computed}")]
    DataRootMismatch {
        /// Hex of the declared root
        declared: String,
        /// Hex of the recomputed root
        computed: String,
    },

    /// Erasure coding collaborator failed
    #[error("Erasure coding error: {0}")]
    ErasureCoding(String),

    /// Subtree root lookup failed
    #[error("Subtree root lookup failed: {0}")]
    SubtreeLookup(String),

    /// Pruning policy broke its contract
    #[error("Pruning policy error: {0}")]
    Pruning(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DataAvailabilityError {
    /// Errors caused by a single input item; preparation excludes the item
    /// and carries on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Decode(_)
                | Self::InvalidTransaction(_)
                | Self::InvalidBlobMessage(_)
                | Self::ReservedNamespace(_)
                | Self::InvalidNamespaceLength { .. }
                | Self::NotWireBlob
                | Self::MissingCommitment { .. }
        )
    }

    /// Errors that always abort the proposal cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::IncorrectNumberOfIndexes { .. }
                | Self::UnexpectedFirstBlobShareIndex { .. }
                | Self::UnexpectedBlobShareIndex { .. }
                | Self::BlobsOutOfOrder { .. }
                | Self::SquareOverflow { .. }
                | Self::ShareRangeOutOfBounds { .. }
                | Self::CommitmentMismatch { .. }
                | Self::DataRootMismatch { .. }
                | Self::ErasureCoding(_)
                | Self::SubtreeLookup(_)
                | Self::Pruning(_)
        )
    }
}

impl From<bincode::Error> for DataAvailabilityError {
    fn from(err: bincode::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
