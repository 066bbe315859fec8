//! Default implementations of the outbound ports

pub mod erasure;
pub mod hasher;
pub mod pruning;
pub mod subtree_cache;

pub use erasure::ReedSolomonExtender;
pub use hasher::{MerkleHeaderBuilder, Sha256TreeHasher};
pub use pruning::TailPruner;
pub use subtree_cache::EdsSubtreeRootCacher;
