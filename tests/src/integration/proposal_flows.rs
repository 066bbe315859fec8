//! # Proposal Flow Tests
//!
//! A proposer prepares a block from raw candidates; an independent validator
//! re-derives the square from the gossiped block data and either accepts it or
//! rejects it.
//!
//! ## Flows Tested:
//!
//! 1. **Blob ordering**: blobs are laid out by namespace, payments keep their
//!    submission order
//! 2. **Square sizing**: oversized candidate sets saturate at the largest width
//! 3. **Data root binding**: any change to the block data breaks the root
//! 4. **Commitment binding**: a payment must commit to the blob it points at,
//!    even when the proposer recomputes a consistent data root

#[cfg(test)]
mod tests {
    use crate::fixtures::{random_blob, random_namespace, transfer, wire_tx};
    use qc_18_data_availability::adapters::{EdsSubtreeRootCacher, ReedSolomonExtender};
    use qc_18_data_availability::{
        blob_shares_used, estimate_square_size, get_commitment, parse_txs, BlockData,
        DataSquareConfig, DataSquareService, ErasureCoder, MalleatedTx, MsgPayForBlob,
        NamespaceId, PreparedProposal, ProposalHandler, ProposalVerdict, SignedTx, TxBody,
        MAX_SQUARE_SIZE,
    };
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn proposer() -> DataSquareService {
        DataSquareService::new(DataSquareConfig::default()).unwrap()
    }

    fn validator() -> DataSquareService {
        DataSquareService::new(DataSquareConfig::default()).unwrap()
    }

    /// Every malleated payment in the block with its share index
    fn payments(block: &BlockData) -> Vec<(u32, MsgPayForBlob)> {
        block
            .txs
            .iter()
            .filter_map(|raw| MalleatedTx::unwrap(raw))
            .map(|wrapped| {
                let tx = SignedTx::decode(&wrapped.tx).unwrap();
                let TxBody::PayForBlob(msg) = tx.body else {
                    panic!("malleated tx without payment body");
                };
                (wrapped.share_index, msg)
            })
            .collect()
    }

    fn assert_accepted(validator: &DataSquareService, prepared: &PreparedProposal) {
        let bytes = prepared.block_data.encode().unwrap();
        assert_eq!(
            validator.process_proposal(&bytes, &prepared.data_root()),
            ProposalVerdict::Accept
        );
    }

    // =============================================================================
    // SCENARIO 1: BLOB ORDERING
    // =============================================================================

    #[test]
    fn test_blobs_ordered_by_namespace() {
        init_tracing();
        let txs = vec![
            wire_tx([2; 8], vec![0x22; 512]),
            wire_tx([1; 8], vec![0x11]),
            wire_tx([3; 8], vec![0x33]),
        ];
        let prepared = proposer().prepare_proposal(&txs, &[]).unwrap();
        let block = &prepared.block_data;

        let namespaces: Vec<NamespaceId> = block.blobs.iter().map(|b| b.namespace).collect();
        assert_eq!(
            namespaces,
            vec![
                NamespaceId::new([1; 8]),
                NamespaceId::new([2; 8]),
                NamespaceId::new([3; 8])
            ]
        );
        assert_eq!(block.txs.len(), 3);

        // payments stay in submission order
        let payment_namespaces: Vec<NamespaceId> =
            payments(block).into_iter().map(|(_, msg)| msg.namespace).collect();
        assert_eq!(
            payment_namespaces,
            vec![
                NamespaceId::new([2; 8]),
                NamespaceId::new([1; 8]),
                NamespaceId::new([3; 8])
            ]
        );
        assert_accepted(&validator(), &prepared);
    }

    #[test]
    fn test_share_indexes_follow_namespace_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let txs: Vec<Vec<u8>> = (0..12)
            .map(|_| {
                let len = rng.gen_range(1..1500);
                wire_tx(random_namespace(&mut rng), random_blob(&mut rng, len))
            })
            .collect();
        let prepared = proposer().prepare_proposal(&txs, &[]).unwrap();

        let mut placed: Vec<(NamespaceId, u32)> = payments(&prepared.block_data)
            .into_iter()
            .map(|(index, msg)| (msg.namespace, index))
            .collect();
        placed.sort();
        for pair in placed.windows(2) {
            if pair[0].0 != pair[1].0 {
                assert!(pair[0].1 < pair[1].1, "{:?} placed after {:?}", pair[0], pair[1]);
            }
        }
    }

    // =============================================================================
    // SCENARIO 2: SQUARE SIZING
    // =============================================================================

    #[test]
    fn test_many_small_blobs_saturate_square() {
        let config = DataSquareConfig::default();
        let service = proposer();
        let txs: Vec<Vec<u8>> = (0..8000u32)
            .map(|i| {
                let mut namespace = [0x40; 8];
                namespace[4..].copy_from_slice(&i.to_be_bytes());
                wire_tx(namespace, vec![0x5A; 100])
            })
            .collect();

        let parsed = parse_txs(&txs, service.hasher(), &config);
        assert_eq!(parsed.len(), 8000);
        let estimate = estimate_square_size(&parsed, &[], &config);
        assert_eq!(estimate.square_size, MAX_SQUARE_SIZE);
        assert!(estimate.overflows());
    }

    #[test]
    fn test_overflowing_candidates_are_pruned() {
        let config = DataSquareConfig {
            max_square_size: 4,
            ..DataSquareConfig::default()
        };
        let proposer = DataSquareService::new(config.clone()).unwrap();
        let txs: Vec<Vec<u8>> = (0..60).map(transfer).collect();

        let prepared = proposer.prepare_proposal(&txs, &[]).unwrap();
        let kept = prepared.block_data.txs.len();
        assert!(kept > 0 && kept < txs.len());
        assert_eq!(prepared.block_data.txs, txs[..kept].to_vec());
        assert_eq!(prepared.block_data.square_size, 4);
        assert_eq!(
            proposer.metrics().get_transactions_dropped(),
            (txs.len() - kept) as u64
        );

        let validator = DataSquareService::new(config).unwrap();
        assert_accepted(&validator, &prepared);
    }

    // =============================================================================
    // SCENARIO 3: DATA ROOT BINDING
    // =============================================================================

    #[test]
    fn test_declared_root_mismatch_rejected() {
        let txs = vec![transfer(1), wire_tx([9; 8], vec![9; 900]), transfer(2)];
        let prepared = proposer().prepare_proposal(&txs, &[]).unwrap();
        let bytes = prepared.block_data.encode().unwrap();

        let mut wrong_root = prepared.data_root();
        wrong_root[31] ^= 1;
        let validator = validator();
        assert!(!validator.process_proposal(&bytes, &wrong_root).is_accept());
        assert_eq!(validator.metrics().get_proposals_rejected(), 1);
    }

    #[test]
    fn test_modified_transaction_rejected() {
        let txs = vec![transfer(1), transfer(2)];
        let prepared = proposer().prepare_proposal(&txs, &[]).unwrap();
        let mut block = prepared.block_data.clone();
        let last = block.txs[1].len() - 1;
        block.txs[1][last] ^= 0xFF;

        let verdict =
            validator().process_proposal(&block.encode().unwrap(), &prepared.data_root());
        let ProposalVerdict::Reject(reason) = verdict else {
            panic!("tampered block accepted");
        };
        assert!(reason.contains("Data root mismatch"), "unexpected reason: {reason}");
    }

    // =============================================================================
    // SCENARIO 4: COMMITMENT BINDING
    // =============================================================================

    #[test]
    fn test_forged_commitment_rejected_despite_consistent_root() {
        let proposer = proposer();
        let txs = vec![wire_tx([4; 8], vec![4; 3000]), wire_tx([5; 8], vec![5; 64])];
        let prepared = proposer.prepare_proposal(&txs, &[]).unwrap();
        let mut block = prepared.block_data;

        // swap in a payment that commits to different data, then reseal
        let position = block
            .txs
            .iter()
            .position(|raw| MalleatedTx::unwrap(raw).is_some())
            .unwrap();
        let mut wrapped = MalleatedTx::unwrap(&block.txs[position]).unwrap();
        let mut payment = SignedTx::decode(&wrapped.tx).unwrap();
        let TxBody::PayForBlob(msg) = &mut payment.body else {
            panic!("malleated tx without payment body");
        };
        msg.share_commitment[0] ^= 0xFF;
        wrapped.tx = payment.encode().unwrap();
        block.txs[position] = wrapped.wrap().unwrap();

        let shares = block.shares().unwrap();
        let (_, root) = proposer
            .commit_square(block.square_size as usize, &shares)
            .unwrap();
        block.hash = root;

        let verdict = validator().process_proposal(&block.encode().unwrap(), &root);
        let ProposalVerdict::Reject(reason) = verdict else {
            panic!("tampered block accepted");
        };
        assert!(reason.contains("Commitment mismatch"), "unexpected reason: {reason}");
    }

    // =============================================================================
    // ROUND TRIPS
    // =============================================================================

    #[test]
    fn test_commitments_recomputed_from_header() {
        let service = proposer();
        let txs = vec![
            wire_tx([7; 8], vec![7; 5000]),
            transfer(1),
            wire_tx([6; 8], vec![6; 247]),
            wire_tx([8; 8], vec![8; 249]),
        ];
        let prepared = service.prepare_proposal(&txs, &[vec![0xEE; 120]]).unwrap();
        let block = &prepared.block_data;
        let square_size = block.square_size as usize;

        let eds = ReedSolomonExtender
            .extend(square_size, &block.shares().unwrap())
            .unwrap();
        let cacher = EdsSubtreeRootCacher::new(&eds, service.hasher());
        for (index, msg) in payments(block) {
            let commitment = get_commitment(
                &cacher,
                &prepared.header,
                service.hasher(),
                index as usize,
                blob_shares_used(msg.blob_size as usize),
            )
            .unwrap();
            assert_eq!(commitment, msg.share_commitment);
        }
    }

    #[test]
    fn test_preparation_is_idempotent() {
        let txs = vec![
            wire_tx([3; 8], vec![3; 700]),
            transfer(1),
            wire_tx([3; 8], vec![4; 20]),
            wire_tx([1; 8], vec![1; 2600]),
        ];
        let evidence = vec![vec![0xEE; 300]];
        let first = proposer().prepare_proposal(&txs, &evidence).unwrap();
        let second = proposer().prepare_proposal(&txs, &evidence).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.block_data.encode().unwrap(),
            second.block_data.encode().unwrap()
        );
    }

    #[test]
    fn test_random_blocks_validate() {
        init_tracing();
        let mut rng = StdRng::seed_from_u64(18);
        let validator = validator();

        for round in 0..6u64 {
            let mut txs = Vec::new();
            for i in 0..rng.gen_range(0..15) {
                if rng.gen_bool(0.3) {
                    txs.push(transfer(round * 100 + i));
                } else {
                    let len = rng.gen_range(1..4000);
                    txs.push(wire_tx(random_namespace(&mut rng), random_blob(&mut rng, len)));
                }
            }
            let evidence: Vec<Vec<u8>> = (0..rng.gen_range(0..3))
                .map(|_| {
                    let len = rng.gen_range(1..500);
                    random_blob(&mut rng, len)
                })
                .collect();

            let prepared = proposer().prepare_proposal(&txs, &evidence).unwrap();
            let square_size = prepared.block_data.square_size as usize;
            assert!(square_size.is_power_of_two());
            assert!(square_size <= MAX_SQUARE_SIZE);
            assert_eq!(prepared.block_data.txs.len(), txs.len());
            assert_accepted(&validator, &prepared);
        }
        assert_eq!(validator.metrics().get_proposals_accepted(), 6);
    }
}
