//! Data Square Service Implementation
//!
//! Wires the domain pipeline to the outbound ports and implements the
//! [`ProposalHandler`] API used by consensus.

use crate::{
    adapters::{
        EdsSubtreeRootCacher, MerkleHeaderBuilder, ReedSolomonExtender, Sha256TreeHasher,
        TailPruner,
    },
    config::DataSquareConfig,
    domain::{
        blob_shares_used, blob_start_indices, contiguous_share_count, estimate_square_size,
        fits_max_square, get_commitment, malleate, parse_txs, render_square, split, Blob,
        BlockData, DataAvailabilityHeader, MalleatedTransaction, MalleatedTx, ParsedTx, Share,
        SignedTx, TxBody,
    },
    error::{DataAvailabilityError, Result},
    metrics::Metrics,
    ports::{
        ErasureCoder, HeaderBuilder, PreparedProposal, ProposalHandler, ProposalVerdict,
        PruningPolicy, TreeHasher,
    },
    utils::codec::MAX_BLOCK_BYTES,
    Hash,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

/// Proposal preparation and validation over pluggable collaborators
pub struct DataSquareService {
    config: DataSquareConfig,
    erasure: Arc<dyn ErasureCoder>,
    hasher: Arc<dyn TreeHasher>,
    header_builder: Arc<dyn HeaderBuilder>,
    pruner: Arc<dyn PruningPolicy>,
    metrics: Metrics,
}

impl DataSquareService {
    /// Create a service with the default adapters.
    ///
    /// Fails if `config` does not describe a valid range of square widths.
    pub fn new(config: DataSquareConfig) -> Result<Self> {
        config.validate()?;
        info!("[qc-18] Initializing Data Square Service");
        info!(
            "  Square widths: {}..={}",
            config.min_square_size, config.max_square_size
        );

        let hasher: Arc<dyn TreeHasher> = Arc::new(Sha256TreeHasher);
        Ok(Self {
            config,
            erasure: Arc::new(ReedSolomonExtender),
            header_builder: Arc::new(MerkleHeaderBuilder::new(Arc::clone(&hasher))),
            hasher,
            pruner: Arc::new(TailPruner),
            metrics: Metrics::new(),
        })
    }

    /// Replace the erasure coder
    pub fn with_erasure_coder(mut self, erasure: Arc<dyn ErasureCoder>) -> Self {
        self.erasure = erasure;
        self
    }

    /// Replace the tree hasher, rebuilding the header builder on top of it
    pub fn with_tree_hasher(mut self, hasher: Arc<dyn TreeHasher>) -> Self {
        self.header_builder = Arc::new(MerkleHeaderBuilder::new(Arc::clone(&hasher)));
        self.hasher = hasher;
        self
    }

    /// Replace the header builder
    pub fn with_header_builder(mut self, header_builder: Arc<dyn HeaderBuilder>) -> Self {
        self.header_builder = header_builder;
        self
    }

    /// Replace the pruning policy
    pub fn with_pruning_policy(mut self, pruner: Arc<dyn PruningPolicy>) -> Self {
        self.pruner = pruner;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &DataSquareConfig {
        &self.config
    }

    /// Service metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Tree hasher used for commitments and data roots
    pub fn hasher(&self) -> &dyn TreeHasher {
        self.hasher.as_ref()
    }

    /// Extend an original square and derive its header and data root
    pub fn commit_square(
        &self,
        square_size: usize,
        shares: &[Share],
    ) -> Result<(DataAvailabilityHeader, Hash)> {
        let eds = self.erasure.extend(square_size, shares)?;
        let header = self.header_builder.build(&eds)?;
        let root = header.hash(self.hasher.as_ref());
        Ok((header, root))
    }

    #[instrument(skip_all, fields(candidates = txs.len(), evidence = evidence.len()))]
    fn prepare(&self, txs: &[Vec<u8>], evidence: &[Vec<u8>]) -> Result<PreparedProposal> {
        let parsed = parse_txs(txs, self.hasher.as_ref(), &self.config);
        let mut dropped = txs.len() - parsed.len();

        let parsed = if fits_max_square(&parsed, evidence, &self.config) {
            parsed
        } else {
            let before = parsed.len();
            let kept = self.pruner.prune(parsed, evidence, &self.config);
            dropped += before.checked_sub(kept.len()).ok_or_else(|| {
                DataAvailabilityError::Pruning(format!(
                    "policy returned {} of {} candidates",
                    kept.len(),
                    before
                ))
            })?;
            kept
        };
        let estimate = estimate_square_size(&parsed, evidence, &self.config);
        let square_size = estimate.square_size;

        // payments stay at their submission position; placeholder index 0
        // wraps to the same length as the final one
        let mut block_txs = Vec::with_capacity(parsed.len());
        let mut malleated: Vec<(usize, MalleatedTransaction)> = Vec::new();
        for tx in &parsed {
            match tx {
                ParsedTx::Plain(raw) => block_txs.push(raw.clone()),
                ParsedTx::WireBlob(_) => match malleate(tx, square_size as u64) {
                    Ok(m) => {
                        malleated.push((block_txs.len(), m));
                        block_txs.push(Vec::new());
                    }
                    Err(err) => {
                        dropped += 1;
                        debug!(error = %err, "[qc-18] dropping unmalleable tx");
                    }
                },
            }
        }
        for (slot, m) in &malleated {
            block_txs[*slot] = m.wrap()?;
        }

        malleated.sort_by_key(|(_, m)| m.blob.namespace);
        let contiguous = contiguous_share_count(&block_txs, evidence);
        let blob_lens: Vec<usize> = malleated.iter().map(|(_, m)| m.blob.shares_used()).collect();
        let (end, starts) = blob_start_indices(contiguous, square_size, &blob_lens);
        if end > square_size * square_size {
            return Err(DataAvailabilityError::SquareOverflow {
                used: end,
                square_size,
            });
        }

        let mut indexes = Vec::with_capacity(starts.len());
        for ((slot, m), &start) in malleated.iter_mut().zip(&starts) {
            m.share_index =
                u32::try_from(start).map_err(|_| DataAvailabilityError::SquareOverflow {
                    used: end,
                    square_size,
                })?;
            indexes.push(m.share_index);
            block_txs[*slot] = m.wrap()?;
        }
        let blobs: Vec<Blob> = malleated.into_iter().map(|(_, m)| m.blob).collect();

        let shares = split(square_size, &block_txs, evidence, &blobs, &indexes)?;
        let (header, root) = self.commit_square(square_size, &shares)?;
        trace!("[qc-18] square layout:\n{}", render_square(&shares, square_size));

        self.metrics.record_prepared(square_size, blobs.len());
        self.metrics.record_dropped(dropped);
        info!(
            txs = block_txs.len(),
            blobs = blobs.len(),
            dropped,
            "[qc-18] Prepared square of width {} (data root {})",
            square_size,
            hex::encode(root)
        );

        Ok(PreparedProposal {
            block_data: BlockData {
                txs: block_txs,
                evidence: evidence.to_vec(),
                blobs,
                square_size: square_size as u64,
                hash: root,
            },
            header,
        })
    }

    #[instrument(skip_all, fields(bytes = block_data.len()))]
    fn validate(&self, block_data: &[u8], declared_root: &Hash) -> Result<()> {
        let block = BlockData::decode(block_data)?;
        if !self.config.is_valid_square_size(block.square_size) {
            return Err(DataAvailabilityError::InvalidSquareSize(block.square_size));
        }
        let square_size = block.square_size as usize;

        let shares = block.shares()?;
        let eds = self.erasure.extend(square_size, &shares)?;
        let dah = self.header_builder.build(&eds)?;
        let root = dah.hash(self.hasher.as_ref());
        for declared in [declared_root, &block.hash] {
            if root != *declared {
                return Err(DataAvailabilityError::DataRootMismatch {
                    declared: hex::encode(declared),
                    computed: hex::encode(root),
                });
            }
        }

        let cacher = EdsSubtreeRootCacher::new(&eds, self.hasher.as_ref());
        let mut payments = 0usize;
        for raw in &block.txs {
            let Some(wrapped) = MalleatedTx::unwrap(raw) else {
                continue;
            };
            let tx = match SignedTx::decode(&wrapped.tx) {
                Ok(tx) => tx,
                Err(err) => {
                    warn!(error = %err, "[qc-18] skipping undecodable malleated payment");
                    continue;
                }
            };
            let TxBody::PayForBlob(msg) = &tx.body else {
                return Err(DataAvailabilityError::InvalidTransaction(
                    "malleated transaction does not carry a payment".into(),
                ));
            };
            msg.validate_basic()?;
            if msg.square_size != block.square_size {
                return Err(DataAvailabilityError::InvalidBlobMessage(format!(
                    "payment commits to width {} but the square has width {}",
                    msg.square_size, block.square_size
                )));
            }
            let blob_size = usize::try_from(msg.blob_size)
                .ok()
                .filter(|size| *size as u64 <= MAX_BLOCK_BYTES)
                .ok_or_else(|| {
                    DataAvailabilityError::InvalidBlobMessage(format!(
                        "blob size {} exceeds block limit",
                        msg.blob_size
                    ))
                })?;

            let start = wrapped.share_index as usize;
            if shares.get(start).map(Share::namespace) != Some(msg.namespace) {
                return Err(DataAvailabilityError::InvalidBlobMessage(format!(
                    "share {start} is not in namespace {}",
                    msg.namespace
                )));
            }
            let commitment = get_commitment(
                &cacher,
                &dah,
                self.hasher.as_ref(),
                start,
                blob_shares_used(blob_size),
            )?;
            if commitment != msg.share_commitment {
                return Err(DataAvailabilityError::CommitmentMismatch {
                    share_index: wrapped.share_index,
                });
            }
            payments += 1;
        }

        if payments != block.blobs.len() {
            return Err(DataAvailabilityError::IncorrectNumberOfIndexes {
                indexes: payments,
                blobs: block.blobs.len(),
            });
        }
        Ok(())
    }
}

impl ProposalHandler for DataSquareService {
    fn prepare_proposal(
        &self,
        txs: &[Vec<u8>],
        evidence: &[Vec<u8>],
    ) -> Result<PreparedProposal> {
        self.prepare(txs, evidence)
    }

    fn process_proposal(&self, block_data: &[u8], declared_root: &Hash) -> ProposalVerdict {
        match self.validate(block_data, declared_root) {
            Ok(()) => {
                self.metrics.record_accepted();
                debug!("[qc-18] Accepted proposal block");
                ProposalVerdict::Accept
            }
            Err(err) => {
                self.metrics.record_rejected();
                error!("[qc-18] Rejected proposal block: {}", err);
                ProposalVerdict::Reject(err.to_string())
            }
        }
    }
}
