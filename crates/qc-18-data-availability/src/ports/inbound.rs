//! Inbound ports (driving side - API)

use crate::domain::{BlockData, DataAvailabilityHeader};
use crate::error::Result;
use crate::Hash;

/// A prepared proposal ready to hand to consensus
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedProposal {
    /// Block data to gossip; carries the square size and data root
    pub block_data: BlockData,
    /// Header the data root was derived from
    pub header: DataAvailabilityHeader,
}

impl PreparedProposal {
    /// Data root of the proposal
    pub fn data_root(&self) -> Hash {
        self.block_data.hash
    }
}

/// Outcome of validating a proposal
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProposalVerdict {
    /// Every check passed
    Accept,
    /// First failed check
    Reject(String),
}

impl ProposalVerdict {
    /// Whether the proposal was accepted
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// API for the consensus engine
pub trait ProposalHandler: Send + Sync {
    /// Build block data, square size and data root from candidates
    fn prepare_proposal(&self, txs: &[Vec<u8>], evidence: &[Vec<u8>])
        -> Result<PreparedProposal>;

    /// Validate encoded block data against the declared data root
    fn process_proposal(&self, block_data: &[u8], declared_root: &Hash) -> ProposalVerdict;
}
