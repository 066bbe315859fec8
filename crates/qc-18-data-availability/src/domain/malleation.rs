//! Malleation of wire-blob transactions
//!
//! A wire transaction is split into a detached blob and a payment
//! transaction that references the blob by namespace, size and commitment
//! for the chosen square size. The payment is then wrapped with the SHA-256
//! of the original submission and the share index of its blob.

use super::block::Blob;
use super::transaction::{ParsedTx, SignedTx, TxBody};
use crate::error::{DataAvailabilityError, Result};
use crate::utils::codec::{self, MAX_TX_BYTES};
use crate::utils::sha256;
use crate::Hash;
use serde::{Deserialize, Serialize};

/// Marks a contiguous-share unit as a malleated payment
pub const MALLEATED_TX_PREFIX: [u8; 4] = *b"MTX1";

/// Wrapped payment transaction as stored in the square
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalleatedTx {
    /// SHA-256 of the original wire transaction
    pub original_tx_hash: Hash,
    /// Share index of the paid-for blob
    pub share_index: u32,
    /// Encoded payment transaction
    pub tx: Vec<u8>,
}

impl MalleatedTx {
    /// Prefix and encode. The length does not depend on `share_index`.
    pub fn wrap(&self) -> Result<Vec<u8>> {
        let mut out = MALLEATED_TX_PREFIX.to_vec();
        out.extend(codec::encode(self, MAX_TX_BYTES)?);
        Ok(out)
    }

    /// Inverse of [`Self::wrap`]; `None` for anything else
    pub fn unwrap(raw: &[u8]) -> Option<Self> {
        let body = raw.strip_prefix(&MALLEATED_TX_PREFIX[..])?;
        codec::decode(body, MAX_TX_BYTES).ok()
    }
}

/// Payment and detached blob derived from one wire transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalleatedTransaction {
    /// Payment carrying a `PayForBlob` body
    pub payment: SignedTx,
    /// Blob detached from the wire message
    pub blob: Blob,
    /// SHA-256 of the original wire transaction
    pub original_tx_hash: Hash,
    /// Share index assigned to the blob; 0 until placement runs
    pub share_index: u32,
}

impl MalleatedTransaction {
    /// Wrapped bytes for the contiguous transaction run
    pub fn wrap(&self) -> Result<Vec<u8>> {
        MalleatedTx {
            original_tx_hash: self.original_tx_hash,
            share_index: self.share_index,
            tx: self.payment.encode()?,
        }
        .wrap()
    }
}

/// Split a wire transaction for a square of width `square_size`.
///
/// Fails for plain transactions and for wire messages that carry no
/// commitment for `square_size`.
pub fn malleate(parsed: &ParsedTx, square_size: u64) -> Result<MalleatedTransaction> {
    let ParsedTx::WireBlob(wire) = parsed else {
        return Err(DataAvailabilityError::NotWireBlob);
    };
    let (msg, signature) = wire.msg.payment_for(square_size)?;

    Ok(MalleatedTransaction {
        payment: SignedTx {
            sender: wire.tx.sender,
            nonce: wire.tx.nonce,
            fee: wire.tx.fee,
            gas_limit: wire.tx.gas_limit,
            body: TxBody::PayForBlob(msg),
            signature,
        },
        blob: Blob::new(wire.msg.namespace, wire.msg.blob.clone()),
        original_tx_hash: sha256(&wire.raw),
        share_index: 0,
    })
}

/// Share indexes of every malleated transaction, ascending
pub fn extract_share_indexes(txs: &[Vec<u8>]) -> Vec<u32> {
    let mut indexes: Vec<u32> = txs
        .iter()
        .filter_map(|raw| MalleatedTx::unwrap(raw))
        .map(|m| m.share_index)
        .collect();
    indexes.sort_unstable();
    indexes
}
