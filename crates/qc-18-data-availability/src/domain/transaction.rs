//! Transaction model and parser
//!
//! A wire transaction embeds a blob together with the payment for it and a
//! share commitment per square size the blob may end up in. Parsing sorts
//! candidates into plain transactions and validated wire-blob transactions;
//! everything else is dropped.

use super::commitment::create_commitment;
use super::estimator::all_square_sizes;
use super::malleation::MalleatedTx;
use super::namespace::NamespaceId;
use crate::config::DataSquareConfig;
use crate::error::{DataAvailabilityError, Result};
use crate::ports::TreeHasher;
use crate::utils::codec::{self, MAX_TX_BYTES};
use crate::Hash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Account address
pub type Address = [u8; 20];

/// Signed transaction envelope
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    /// Sending account
    pub sender: Address,
    /// Sender sequence number
    pub nonce: u64,
    /// Fee offered
    pub fee: u64,
    /// Gas limit
    pub gas_limit: u64,
    /// Transaction payload
    pub body: TxBody,
    /// Signature over the payload
    pub signature: Vec<u8>,
}

/// Transaction payloads
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxBody {
    /// Value transfer
    Transfer {
        /// Recipient
        to: Address,
        /// Amount transferred
        amount: u64,
    },
    /// Blob with payment, as submitted by a user
    WirePayForBlob(MsgWirePayForBlob),
    /// Payment for a detached blob, produced by malleation
    PayForBlob(MsgPayForBlob),
}

/// Commitment to a blob's shares in a square of one width, plus the
/// signature over the payment message that uses it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareCommitmentAndSignature {
    /// Square width the commitment is for
    pub square_size: u64,
    /// Commitment to the blob's shares
    pub commitment: Hash,
    /// Signature over the matching `MsgPayForBlob`
    pub signature: Vec<u8>,
}

/// Blob plus payment, prior to malleation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgWirePayForBlob {
    /// Namespace the blob is stored under
    pub namespace: NamespaceId,
    /// Declared blob length in bytes
    pub blob_size: u64,
    /// Blob payload
    pub blob: Vec<u8>,
    /// One commitment per candidate square size
    pub share_commitments: Vec<ShareCommitmentAndSignature>,
}

/// Payment for a blob stored elsewhere in the square
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgPayForBlob {
    /// Namespace of the blob
    pub namespace: NamespaceId,
    /// Blob length in bytes
    pub blob_size: u64,
    /// Commitment to the blob's shares
    pub share_commitment: Hash,
    /// Square width the commitment is for
    pub square_size: u64,
}

impl SignedTx {
    /// Encode to wire bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self, MAX_TX_BYTES)
    }

    /// Decode from wire bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::decode(bytes, MAX_TX_BYTES)
    }

    /// Structural checks independent of chain state
    pub fn validate_basic(&self) -> Result<()> {
        if self.gas_limit == 0 {
            return Err(DataAvailabilityError::InvalidTransaction(
                "zero gas limit".into(),
            ));
        }
        if self.signature.is_empty() {
            return Err(DataAvailabilityError::InvalidTransaction(
                "missing signature".into(),
            ));
        }
        Ok(())
    }
}

impl MsgWirePayForBlob {
    /// Build a wire message committing to `blob` for every square size in
    /// `square_sizes`. Signatures are left empty for the caller to fill in
    /// with [`Self::sign_commitments`].
    pub fn new(
        namespace: NamespaceId,
        blob: Vec<u8>,
        square_sizes: &[u64],
        hasher: &dyn TreeHasher,
    ) -> Result<Self> {
        let share_commitments = square_sizes
            .iter()
            .map(|&square_size| {
                Ok(ShareCommitmentAndSignature {
                    square_size,
                    commitment: create_commitment(square_size, namespace, &blob, hasher)?,
                    signature: Vec::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            namespace,
            blob_size: blob.len() as u64,
            blob,
            share_commitments,
        })
    }

    /// Sign the payment message of every commitment
    pub fn sign_commitments<F>(&mut self, sign: F)
    where
        F: Fn(&MsgPayForBlob) -> Vec<u8>,
    {
        for i in 0..self.share_commitments.len() {
            let payment = self.payment_at(i);
            self.share_commitments[i].signature = sign(&payment);
        }
    }

    /// Payment message and signature for a square of width `square_size`
    pub fn payment_for(&self, square_size: u64) -> Result<(MsgPayForBlob, Vec<u8>)> {
        let position = self
            .share_commitments
            .iter()
            .position(|c| c.square_size == square_size)
            .ok_or(DataAvailabilityError::MissingCommitment { square_size })?;
        Ok((
            self.payment_at(position),
            self.share_commitments[position].signature.clone(),
        ))
    }

    fn payment_at(&self, position: usize) -> MsgPayForBlob {
        let c = &self.share_commitments[position];
        MsgPayForBlob {
            namespace: self.namespace,
            blob_size: self.blob_size,
            share_commitment: c.commitment,
            square_size: c.square_size,
        }
    }

    /// Structural checks, including recomputing every commitment
    pub fn validate_basic(
        &self,
        hasher: &dyn TreeHasher,
        config: &DataSquareConfig,
    ) -> Result<()> {
        if self.namespace.is_reserved() {
            return Err(DataAvailabilityError::ReservedNamespace(self.namespace));
        }
        if self.blob.is_empty() {
            return Err(DataAvailabilityError::InvalidBlobMessage(
                "empty blob".into(),
            ));
        }
        if self.blob_size != self.blob.len() as u64 {
            return Err(DataAvailabilityError::InvalidBlobMessage(format!(
                "declared size {} but blob has {} bytes",
                self.blob_size,
                self.blob.len()
            )));
        }
        if self.share_commitments.is_empty() {
            return Err(DataAvailabilityError::InvalidBlobMessage(
                "no share commitments".into(),
            ));
        }

        let allowed = all_square_sizes(self.blob.len(), config);
        let mut seen = BTreeSet::new();
        for c in &self.share_commitments {
            if !seen.insert(c.square_size) {
                return Err(DataAvailabilityError::InvalidBlobMessage(format!(
                    "duplicate commitment for square size {}",
                    c.square_size
                )));
            }
            if !config.is_valid_square_size(c.square_size) {
                return Err(DataAvailabilityError::InvalidSquareSize(c.square_size));
            }
            if !allowed.contains(&c.square_size) {
                return Err(DataAvailabilityError::InvalidBlobMessage(format!(
                    "blob of {} bytes does not fit a square of width {}",
                    self.blob.len(),
                    c.square_size
                )));
            }
            let expected = create_commitment(c.square_size, self.namespace, &self.blob, hasher)?;
            if expected != c.commitment {
                return Err(DataAvailabilityError::InvalidBlobMessage(format!(
                    "commitment for square size {} does not match blob",
                    c.square_size
                )));
            }
        }
        Ok(())
    }
}

impl MsgPayForBlob {
    /// Structural checks
    pub fn validate_basic(&self) -> Result<()> {
        if self.namespace.is_reserved() {
            return Err(DataAvailabilityError::ReservedNamespace(self.namespace));
        }
        if self.blob_size == 0 {
            return Err(DataAvailabilityError::InvalidBlobMessage(
                "zero blob size".into(),
            ));
        }
        Ok(())
    }
}

/// Decoded wire-blob transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireBlobTx {
    /// Bytes as submitted
    pub raw: Vec<u8>,
    /// Decoded envelope
    pub tx: SignedTx,
    /// Embedded wire message
    pub msg: MsgWirePayForBlob,
}

/// A candidate transaction after parsing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedTx {
    /// Included verbatim
    Plain(Vec<u8>),
    /// Carries a blob and must be malleated
    WireBlob(WireBlobTx),
}

impl ParsedTx {
    /// Bytes as submitted
    pub fn raw(&self) -> &[u8] {
        match self {
            Self::Plain(raw) => raw,
            Self::WireBlob(wire) => &wire.raw,
        }
    }

    /// Embedded wire message, if any
    pub fn wire_message(&self) -> Option<&MsgWirePayForBlob> {
        match self {
            Self::Plain(_) => None,
            Self::WireBlob(wire) => Some(&wire.msg),
        }
    }
}

/// Parse one candidate transaction
pub fn parse_tx(
    raw: &[u8],
    hasher: &dyn TreeHasher,
    config: &DataSquareConfig,
) -> Result<ParsedTx> {
    if MalleatedTx::unwrap(raw).is_some() {
        return Err(DataAvailabilityError::InvalidTransaction(
            "candidate is already malleated".into(),
        ));
    }
    let tx = SignedTx::decode(raw)?;
    match &tx.body {
        TxBody::Transfer { .. } => {
            tx.validate_basic()?;
            Ok(ParsedTx::Plain(raw.to_vec()))
        }
        TxBody::PayForBlob(_) => Err(DataAvailabilityError::InvalidTransaction(
            "payment without blob".into(),
        )),
        TxBody::WirePayForBlob(msg) => {
            tx.validate_basic()?;
            msg.validate_basic(hasher, config)?;
            let msg = msg.clone();
            Ok(ParsedTx::WireBlob(WireBlobTx {
                raw: raw.to_vec(),
                tx,
                msg,
            }))
        }
    }
}

/// Parse candidate transactions, keeping input order and dropping anything
/// undecodable or invalid.
pub fn parse_txs(
    raw_txs: &[Vec<u8>],
    hasher: &dyn TreeHasher,
    config: &DataSquareConfig,
) -> Vec<ParsedTx> {
    raw_txs
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| match parse_tx(raw, hasher, config) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!(index = i, error = %err, "[qc-18] dropping candidate tx");
                None
            }
        })
        .collect()
}
