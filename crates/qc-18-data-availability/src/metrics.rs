//! Metrics collection for the data availability subsystem

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for proposal preparation and validation
#[derive(Debug, Default)]
pub struct Metrics {
    /// Proposals prepared
    pub proposals_prepared: AtomicU64,

    /// Proposals accepted during validation
    pub proposals_accepted: AtomicU64,

    /// Proposals rejected during validation
    pub proposals_rejected: AtomicU64,

    /// Candidate transactions excluded while preparing
    pub transactions_dropped: AtomicU64,

    /// Blobs placed into prepared squares
    pub blobs_included: AtomicU64,

    /// Width of the most recently prepared square
    pub last_square_size: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prepared proposal
    pub fn record_prepared(&self, square_size: usize, blob_count: usize) {
        self.proposals_prepared.fetch_add(1, Ordering::Relaxed);
        self.blobs_included
            .fetch_add(blob_count as u64, Ordering::Relaxed);
        self.last_square_size
            .store(square_size as u64, Ordering::Relaxed);
    }

    /// Record transactions excluded from a proposal
    pub fn record_dropped(&self, count: usize) {
        self.transactions_dropped
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record an accepted proposal
    pub fn record_accepted(&self) {
        self.proposals_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected proposal
    pub fn record_rejected(&self) {
        self.proposals_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get proposals prepared
    pub fn get_proposals_prepared(&self) -> u64 {
        self.proposals_prepared.load(Ordering::Relaxed)
    }

    /// Get proposals rejected
    pub fn get_proposals_rejected(&self) -> u64 {
        self.proposals_rejected.load(Ordering::Relaxed)
    }

    /// Get proposals accepted
    pub fn get_proposals_accepted(&self) -> u64 {
        self.proposals_accepted.load(Ordering::Relaxed)
    }

    /// Get transactions dropped
    pub fn get_transactions_dropped(&self) -> u64 {
        self.transactions_dropped.load(Ordering::Relaxed)
    }

    /// Fraction of validated proposals that were rejected
    pub fn get_rejection_rate(&self) -> f64 {
        let accepted = self.proposals_accepted.load(Ordering::Relaxed);
        let rejected = self.proposals_rejected.load(Ordering::Relaxed);
        let total = accepted + rejected;
        if total == 0 {
            return 0.0;
        }
        rejected as f64 / total as f64
    }
}
