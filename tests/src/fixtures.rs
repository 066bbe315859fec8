//! # Candidate Transaction Fixtures
//!
//! Builders for the raw candidate bytes a proposer receives from the mempool.
//! Signatures are opaque placeholder bytes: signature checking belongs to
//! another subsystem.

use qc_18_data_availability::{
    all_square_sizes, DataSquareConfig, MsgWirePayForBlob, NamespaceId, SignedTx, TreeHasher,
    TxBody,
};
use qc_18_data_availability::adapters::Sha256TreeHasher;
use rand::Rng;

/// Encoded transfer transaction
pub fn transfer(nonce: u64) -> Vec<u8> {
    SignedTx {
        sender: [0x11; 20],
        nonce,
        fee: 10,
        gas_limit: 21_000,
        body: TxBody::Transfer {
            to: [0x22; 20],
            amount: 1_000,
        },
        signature: vec![0xAB; 64],
    }
    .encode()
    .expect("transfer encodes")
}

/// Wire message committing to `blob` for every square width it can occupy
pub fn wire_message(namespace: [u8; 8], blob: Vec<u8>) -> MsgWirePayForBlob {
    let hasher = Sha256TreeHasher;
    wire_message_with(namespace, blob, &hasher)
}

/// [`wire_message`] over an explicit hasher
pub fn wire_message_with(
    namespace: [u8; 8],
    blob: Vec<u8>,
    hasher: &dyn TreeHasher,
) -> MsgWirePayForBlob {
    let sizes = all_square_sizes(blob.len(), &DataSquareConfig::default());
    let mut msg = MsgWirePayForBlob::new(NamespaceId::new(namespace), blob, &sizes, hasher)
        .expect("commitments build");
    msg.sign_commitments(|payment| {
        let mut signature = payment.share_commitment.to_vec();
        signature.extend_from_slice(&payment.square_size.to_be_bytes());
        signature
    });
    msg
}

/// Encoded wire-blob transaction
pub fn wire_tx(namespace: [u8; 8], blob: Vec<u8>) -> Vec<u8> {
    SignedTx {
        sender: [namespace[0]; 20],
        nonce: 0,
        fee: 500,
        gas_limit: 100_000,
        body: TxBody::WirePayForBlob(wire_message(namespace, blob)),
        signature: vec![0xCD; 64],
    }
    .encode()
    .expect("wire tx encodes")
}

/// Random payload of `len` bytes
pub fn random_blob<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

/// Random non-reserved namespace
pub fn random_namespace<R: Rng>(rng: &mut R) -> [u8; 8] {
    let mut namespace: [u8; 8] = rng.gen();
    // keep clear of the reserved low range and the two high sentinels
    namespace[0] = rng.gen_range(0x01..=0xFE);
    namespace
}
