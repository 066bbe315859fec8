//! Share codec
//!
//! Transactions and evidence are packed into contiguous share runs under
//! their reserved namespaces. Each blob gets its own run under its own
//! namespace, preceded by namespaced padding so that it lands on the index
//! the placement rule assigns. Tail padding fills the square.
//!
//! ```text
//! contiguous share: | namespace (8) | first unit offset (1) | payload (247) |
//! blob share:       | namespace (8) | payload (248)                         |
//! ```
//!
//! Splitting is write-only; validators re-derive shares from block data
//! rather than decoding existing shares.

use super::block::Blob;
use super::namespace::NamespaceId;
use super::placement::next_aligned_index;
use crate::error::{DataAvailabilityError, Result};
use crate::{
    BLOB_SHARE_CAPACITY, NAMESPACE_SIZE, SHARE_RESERVED_BYTES, SHARE_SIZE, TX_SHARE_CAPACITY,
};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// One fixed-size namespaced share
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Share([u8; SHARE_SIZE]);

impl Share {
    /// Build a share from a namespace and up to `SHARE_SIZE - NAMESPACE_SIZE`
    /// bytes of payload, zero-padding the remainder.
    pub fn from_parts(namespace: NamespaceId, payload: &[u8]) -> Result<Self> {
        if payload.len() > SHARE_SIZE - NAMESPACE_SIZE {
            return Err(DataAvailabilityError::Encode(format!(
                "share payload of {} bytes exceeds {}",
                payload.len(),
                SHARE_SIZE - NAMESPACE_SIZE
            )));
        }
        let mut bytes = [0u8; SHARE_SIZE];
        bytes[..NAMESPACE_SIZE].copy_from_slice(namespace.as_bytes());
        bytes[NAMESPACE_SIZE..NAMESPACE_SIZE + payload.len()].copy_from_slice(payload);
        Ok(Self(bytes))
    }

    /// Parse a share from exactly `SHARE_SIZE` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SHARE_SIZE] = bytes.try_into().map_err(|_| {
            DataAvailabilityError::Decode(format!(
                "share must be {SHARE_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Zero-filled share under `namespace`
    pub fn padding(namespace: NamespaceId) -> Self {
        let mut bytes = [0u8; SHARE_SIZE];
        bytes[..NAMESPACE_SIZE].copy_from_slice(namespace.as_bytes());
        Self(bytes)
    }

    /// Share that fills the square after the last blob
    pub fn tail_padding() -> Self {
        Self::padding(NamespaceId::TAIL_PADDING)
    }

    /// Namespace prefix of this share
    pub fn namespace(&self) -> NamespaceId {
        let mut ns = [0u8; NAMESPACE_SIZE];
        ns.copy_from_slice(&self.0[..NAMESPACE_SIZE]);
        NamespaceId(ns)
    }

    /// Everything after the namespace
    pub fn payload(&self) -> &[u8] {
        &self.0[NAMESPACE_SIZE..]
    }

    /// Raw share bytes
    pub fn as_bytes(&self) -> &[u8; SHARE_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Share {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Share({}, {}..)",
            self.namespace(),
            hex::encode(&self.payload()[..8])
        )
    }
}

/// Byte length of the length delimiter for a unit of `size` bytes:
/// `ceil(bit_length(size) / 8)`, at least 1.
pub fn delim_len(size: usize) -> usize {
    let bits = (usize::BITS - size.leading_zeros()) as usize;
    bits.div_ceil(8).max(1)
}

/// Big-endian length delimiter of `delim_len(size)` bytes
pub fn encode_delimiter(size: usize) -> Vec<u8> {
    let bytes = (size as u64).to_be_bytes();
    bytes[bytes.len() - delim_len(size)..].to_vec()
}

/// Shares occupied by a blob of `size` bytes, delimiter included.
pub fn blob_shares_used(size: usize) -> usize {
    (delim_len(size) + size).div_ceil(BLOB_SHARE_CAPACITY)
}

/// Bytes a length-delimited unit occupies in a contiguous run.
pub fn delimited_len(size: usize) -> usize {
    delim_len(size) + size
}

/// Packs length-delimited units back to back across shares of one namespace
#[derive(Debug)]
pub struct ContiguousShareSplitter {
    namespace: NamespaceId,
    stream: Vec<u8>,
    unit_starts: Vec<usize>,
}

impl ContiguousShareSplitter {
    /// Create an empty splitter for `namespace`
    pub fn new(namespace: NamespaceId) -> Self {
        Self {
            namespace,
            stream: Vec::new(),
            unit_starts: Vec::new(),
        }
    }

    /// Append one unit
    pub fn write(&mut self, unit: &[u8]) {
        self.unit_starts.push(self.stream.len());
        self.stream.extend_from_slice(&encode_delimiter(unit.len()));
        self.stream.extend_from_slice(unit);
    }

    /// Shares the written units occupy
    pub fn count(&self) -> usize {
        self.stream.len().div_ceil(TX_SHARE_CAPACITY)
    }

    /// Finish and return the shares. The reserved byte of each share holds
    /// the offset of the first unit starting in it, or 0.
    pub fn export(self) -> Vec<Share> {
        let header = NAMESPACE_SIZE + SHARE_RESERVED_BYTES;
        let mut starts = self.unit_starts.iter().copied().peekable();
        let mut shares = Vec::with_capacity(self.count());

        for (i, chunk) in self.stream.chunks(TX_SHARE_CAPACITY).enumerate() {
            let base = i * TX_SHARE_CAPACITY;
            while starts.next_if(|&s| s < base).is_some() {}
            let reserved = match starts.peek() {
                Some(&s) if s < base + TX_SHARE_CAPACITY => (header + s - base) as u8,
                _ => 0,
            };

            let mut bytes = [0u8; SHARE_SIZE];
            bytes[..NAMESPACE_SIZE].copy_from_slice(self.namespace.as_bytes());
            bytes[NAMESPACE_SIZE] = reserved;
            bytes[header..header + chunk.len()].copy_from_slice(chunk);
            shares.push(Share(bytes));
        }
        shares
    }
}

/// Writes blobs into their own share runs, with namespaced padding between
#[derive(Debug, Default)]
pub struct BlobShareSplitter {
    shares: Vec<Share>,
    last_namespace: Option<NamespaceId>,
}

impl BlobShareSplitter {
    /// Create an empty splitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a blob, starting a fresh share
    pub fn write(&mut self, blob: &Blob) -> Result<()> {
        let mut data = encode_delimiter(blob.data.len());
        data.extend_from_slice(&blob.data);
        for chunk in data.chunks(BLOB_SHARE_CAPACITY) {
            self.shares.push(Share::from_parts(blob.namespace, chunk)?);
        }
        self.last_namespace = Some(blob.namespace);
        Ok(())
    }

    /// Append `count` padding shares under the namespace of the previous
    /// blob, or the max reserved namespace before any blob.
    pub fn write_namespaced_padding(&mut self, count: usize) {
        let namespace = self.last_namespace.unwrap_or(NamespaceId::MAX_RESERVED);
        self.shares
            .extend(std::iter::repeat_n(Share::padding(namespace), count));
    }

    /// Shares written so far
    pub fn count(&self) -> usize {
        self.shares.len()
    }

    /// Finish and return the shares
    pub fn export(self) -> Vec<Share> {
        self.shares
    }
}

/// Contiguous transaction shares
pub fn split_txs(txs: &[Vec<u8>]) -> Vec<Share> {
    let mut writer = ContiguousShareSplitter::new(NamespaceId::TRANSACTIONS);
    for tx in txs {
        writer.write(tx);
    }
    writer.export()
}

/// Contiguous evidence shares
pub fn split_evidence(evidence: &[Vec<u8>]) -> Vec<Share> {
    let mut writer = ContiguousShareSplitter::new(NamespaceId::EVIDENCE);
    for item in evidence {
        writer.write(item);
    }
    writer.export()
}

/// Shares occupied by transactions plus evidence, without materializing them
pub fn contiguous_share_count(txs: &[Vec<u8>], evidence: &[Vec<u8>]) -> usize {
    let run = |units: &[Vec<u8>]| {
        units
            .iter()
            .map(|u| delimited_len(u.len()))
            .sum::<usize>()
            .div_ceil(TX_SHARE_CAPACITY)
    };
    run(txs) + run(evidence)
}

/// Lay out a full `square_size²` square.
///
/// `blobs` must be in ascending namespace order and `indexes` must hold one
/// start index per blob, each equal to the index the placement rule assigns
/// given everything written before it.
pub fn split(
    square_size: usize,
    txs: &[Vec<u8>],
    evidence: &[Vec<u8>],
    blobs: &[Blob],
    indexes: &[u32],
) -> Result<Vec<Share>> {
    if indexes.len() != blobs.len() {
        return Err(DataAvailabilityError::IncorrectNumberOfIndexes {
            indexes: indexes.len(),
            blobs: blobs.len(),
        });
    }
    if let Some(position) = blobs
        .windows(2)
        .position(|pair| pair[0].namespace > pair[1].namespace)
    {
        return Err(DataAvailabilityError::BlobsOutOfOrder {
            position: position + 1,
        });
    }

    let mut shares = split_txs(txs);
    shares.extend(split_evidence(evidence));

    let capacity = square_size * square_size;
    let contiguous = shares.len();
    let mut writer = BlobShareSplitter::new();
    for (position, (blob, &declared)) in blobs.iter().zip(indexes).enumerate() {
        let cursor = contiguous + writer.count();
        let (expected, _) =
            next_aligned_index(cursor, blob_shares_used(blob.data.len()), square_size);
        if declared as usize != expected {
            let expected = u32::try_from(expected).unwrap_or(u32::MAX);
            return Err(if position == 0 {
                DataAvailabilityError::UnexpectedFirstBlobShareIndex {
                    expected,
                    actual: declared,
                }
            } else {
                DataAvailabilityError::UnexpectedBlobShareIndex {
                    position,
                    expected,
                    actual: declared,
                }
            });
        }
        if expected >= capacity {
            return Err(DataAvailabilityError::SquareOverflow {
                used: expected + 1,
                square_size,
            });
        }
        writer.write_namespaced_padding(expected - cursor);
        writer.write(blob)?;
    }
    shares.extend(writer.export());

    if shares.len() > capacity {
        return Err(DataAvailabilityError::SquareOverflow {
            used: shares.len(),
            square_size,
        });
    }
    debug!(
        contiguous,
        blobs = blobs.len(),
        padding = capacity - shares.len(),
        "[qc-18] split square of width {}",
        square_size
    );
    shares.resize(capacity, Share::tail_padding());
    Ok(shares)
}

/// What a share in a laid-out square holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareKind {
    /// Contiguous transaction data
    Transaction,
    /// Intermediate state roots
    IntermediateStateRoot,
    /// Contiguous evidence data
    Evidence,
    /// Padding ahead of the first blob
    ReservedPadding,
    /// Blob data or padding under a blob namespace
    Blob(NamespaceId),
    /// Padding after the last blob
    TailPadding,
    /// Erasure-coded parity
    Parity,
}

impl ShareKind {
    /// Classify a share by its namespace
    pub fn of(share: &Share) -> Self {
        match share.namespace() {
            NamespaceId::TRANSACTIONS => Self::Transaction,
            NamespaceId::INTERMEDIATE_STATE_ROOTS => Self::IntermediateStateRoot,
            NamespaceId::EVIDENCE => Self::Evidence,
            NamespaceId::TAIL_PADDING => Self::TailPadding,
            NamespaceId::PARITY => Self::Parity,
            ns if ns.is_reserved() => Self::ReservedPadding,
            ns => Self::Blob(ns),
        }
    }
}

/// Render a square as a character grid, one row per line.
///
/// `T` transactions, `S` state roots, `E` evidence, `-` reserved padding,
/// `.` tail padding, `#` parity; blob namespaces get lowercase letters in
/// order of first appearance.
pub fn render_square(shares: &[Share], square_size: usize) -> String {
    let mut letters: BTreeMap<NamespaceId, char> = BTreeMap::new();
    let mut out = String::with_capacity(shares.len() + square_size);
    for (i, share) in shares.iter().enumerate() {
        let c = match ShareKind::of(share) {
            ShareKind::Transaction => 'T',
            ShareKind::IntermediateStateRoot => 'S',
            ShareKind::Evidence => 'E',
            ShareKind::ReservedPadding => '-',
            ShareKind::TailPadding => '.',
            ShareKind::Parity => '#',
            ShareKind::Blob(ns) => {
                let next = letters.len();
                *letters
                    .entry(ns)
                    .or_insert_with(|| char::from(b'a' + (next % 26) as u8))
            }
        };
        out.push(c);
        if square_size > 0 && (i + 1) % square_size == 0 {
            out.push('\n');
        }
    }
    out
}
