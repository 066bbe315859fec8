//! # Quantum Chain - Data Availability Square (Subsystem 18)
//!
//! **Bounded Context:** Block Data Layout & Data Availability
//! **Architecture Compliance:** DDD + Hexagonal + TDD
//!
//! ## Purpose
//!
//! Turns a candidate block (transactions, evidence, blob-carrying wire
//! transactions) into a deterministic square of fixed-size namespaced shares,
//! erasure-extends it, and derives the data root that consensus signs over.
//! Validators re-derive the same square from the proposed block data and
//! reject anything that does not reproduce the declared root or whose
//! payment transactions do not commit to the blobs they pay for.
//!
//! ## Pipeline
//!
//! ```text
//!  raw txs ──► parse ──► estimate ──► prune ──► malleate ──► sort blobs
//!                                                               │
//!  data root ◄── header ◄── extend ◄── split ◄── place blobs ◄──┘
//! ```
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - Reed-Solomon square extension                    │
//! │  - SHA-256 binary merkle hasher                     │
//! │  - Per-call subtree root cache                      │
//! │  - Tail pruning policy                              │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: ProposalHandler                         │
//! │  - Outbound: ErasureCoder, TreeHasher,              │
//! │    HeaderBuilder, SubtreeRootReader, PruningPolicy  │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - Share codec, placement rule, size estimator      │
//! │  - Transaction parser, malleation, commitments      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Power-of-two squares**: `MIN_SQUARE_SIZE <= k <= MAX_SQUARE_SIZE`
//! 2. **Namespace order**: blobs are laid out in ascending namespace order
//! 3. **Aligned placement**: every blob starts at an index any verifier can
//!    recompute from blob lengths alone
//! 4. **Binding commitments**: every blob is paid for by exactly one
//!    malleated payment transaction whose commitment matches the square
//!
//! ## Module Structure
//!
//! - [`domain`]: Pure domain logic (shares, placement, estimation, commitments)
//! - [`ports`]: Hexagonal architecture interfaces (inbound/outbound)
//! - [`adapters`]: Default collaborator implementations
//! - [`service`]: Proposal preparation and validation

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Default collaborator implementations
pub mod adapters;
/// Domain models and business logic
pub mod domain;
pub mod ports;
pub mod service;
pub mod utils;

mod config;
mod error;
mod metrics;

pub use config::DataSquareConfig;
pub use error::{DataAvailabilityError, Result};
pub use metrics::Metrics;

pub use domain::{
    all_square_sizes, blob_shares_used, blob_start_indices, calculate_commit_paths,
    create_commitment, estimate_square_size, extract_share_indexes, fits_in_square,
    get_commitment, malleate, next_aligned_index, parse_txs, split, Blob, BlockData,
    CommitPath, DataAvailabilityHeader, ExtendedDataSquare, MalleatedTransaction, MalleatedTx,
    MsgPayForBlob, MsgWirePayForBlob, NamespaceId, ParsedTx, Share, ShareCommitmentAndSignature,
    SignedTx, SquareEstimate, TxBody,
};

pub use ports::{
    ErasureCoder, HeaderBuilder, PreparedProposal, ProposalHandler, ProposalVerdict,
    PruningPolicy, SubtreeRootReader, TreeHasher,
};

pub use service::DataSquareService;

/// Subsystem identifier used in log prefixes and IPC envelopes.
pub const SUBSYSTEM_ID: u8 = 18;

/// Size of a single share in bytes.
pub const SHARE_SIZE: usize = 256;

/// Size of a namespace identifier in bytes.
pub const NAMESPACE_SIZE: usize = 8;

/// Bytes reserved at the start of each contiguous share (offset of the first
/// unit that begins in the share).
pub const SHARE_RESERVED_BYTES: usize = 1;

/// Payload capacity of a transaction or evidence share.
pub const TX_SHARE_CAPACITY: usize = SHARE_SIZE - NAMESPACE_SIZE - SHARE_RESERVED_BYTES;

/// Payload capacity of a blob share.
pub const BLOB_SHARE_CAPACITY: usize = SHARE_SIZE - NAMESPACE_SIZE;

/// Smallest permitted original square width.
pub const MIN_SQUARE_SIZE: usize = 1;

/// Largest permitted original square width.
pub const MAX_SQUARE_SIZE: usize = 128;

/// Bytes added to a payment transaction when it is wrapped as malleated:
/// 32 for the original hash, 32 for the share index and 3 for framing.
pub const MALLEATED_TX_OVERHEAD: usize = 32 + 32 + 3;

/// Size of every hash produced by the tree hasher.
pub const HASH_SIZE: usize = 32;

/// A 32-byte hash.
pub type Hash = [u8; HASH_SIZE];
