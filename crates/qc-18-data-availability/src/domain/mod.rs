//! Domain layer: pure square construction logic, no I/O

pub mod block;
pub mod commitment;
pub mod estimator;
pub mod header;
pub mod malleation;
pub mod namespace;
pub mod placement;
pub mod shares;
pub mod transaction;

pub use block::{Blob, BlockData};
pub use commitment::{calculate_commit_paths, create_commitment, get_commitment, CommitPath};
pub use estimator::{
    all_square_sizes, estimate_square_size, fits_max_square, raw_share_count, SquareEstimate,
};
pub use header::{DataAvailabilityHeader, ExtendedDataSquare};
pub use malleation::{extract_share_indexes, malleate, MalleatedTransaction, MalleatedTx};
pub use namespace::NamespaceId;
pub use placement::{blob_start_indices, fits_in_square, next_aligned_index};
pub use shares::{
    blob_shares_used, contiguous_share_count, render_square, split, Share, ShareKind,
};
pub use transaction::{
    parse_tx, parse_txs, MsgPayForBlob, MsgWirePayForBlob, ParsedTx,
    ShareCommitmentAndSignature, SignedTx, TxBody, WireBlobTx,
};
