//! # QC-18 Data Availability Brutal Benchmarks
//!
//! Performance Claims to Validate:
//! - Square estimation: linear in candidate count
//! - Proposal preparation: dominated by erasure extension at large widths
//! - Proposal validation: one extension plus one subtree walk per blob
//!
//! Brutal Conditions:
//! - Thousands of small blobs in distinct namespaces
//! - Maximum square width
//! - Mixed transfer / blob candidate sets

use crate::fixtures::{random_blob, random_namespace, transfer, wire_tx};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use qc_18_data_availability::adapters::ReedSolomonExtender;
use qc_18_data_availability::{
    estimate_square_size, parse_txs, split, DataSquareConfig, DataSquareService, ErasureCoder,
    ProposalHandler,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn candidate_set(count: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            if i % 4 == 0 {
                transfer(i as u64)
            } else {
                let len = rng.gen_range(64..2048);
                wire_tx(random_namespace(&mut rng), random_blob(&mut rng, len))
            }
        })
        .collect()
}

pub fn brutal_square_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-estimation");
    let config = DataSquareConfig::default();
    let service = DataSquareService::new(config.clone()).expect("default config is valid");

    for count in [100usize, 1_000, 4_000] {
        let parsed = parse_txs(&candidate_set(count, 1), service.hasher(), &config);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("estimate", count), &parsed, |b, parsed| {
            b.iter(|| black_box(estimate_square_size(parsed, &[], &config)))
        });
    }

    group.finish();
}

pub fn brutal_erasure_extension(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-extension");
    group.measurement_time(Duration::from_secs(10));

    for width in [16usize, 64, 128] {
        let shares = split(width, &[], &[], &[], &[]).expect("empty square splits");
        group.throughput(Throughput::Elements((width * width) as u64));
        group.bench_with_input(BenchmarkId::new("extend", width), &shares, |b, shares| {
            b.iter(|| black_box(ReedSolomonExtender.extend(width, shares)))
        });
    }

    group.finish();
}

pub fn brutal_prepare_and_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-18-proposal");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);
    let service =
        DataSquareService::new(DataSquareConfig::default()).expect("default config is valid");

    for count in [16usize, 256, 1_024] {
        let txs = candidate_set(count, 2);
        group.bench_with_input(BenchmarkId::new("prepare", count), &txs, |b, txs| {
            b.iter(|| black_box(service.prepare_proposal(txs, &[])))
        });

        let prepared = service.prepare_proposal(&txs, &[]).expect("candidates fit");
        let bytes = prepared.block_data.encode().expect("block encodes");
        let root = prepared.data_root();
        group.bench_with_input(BenchmarkId::new("process", count), &bytes, |b, bytes| {
            b.iter(|| {
                let verdict = service.process_proposal(bytes, &root);
                assert!(verdict.is_accept(), "prepared proposal rejected");
                black_box(verdict)
            })
        });
    }

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    brutal_square_estimation(c);
    brutal_erasure_extension(c);
    brutal_prepare_and_process(c);
}
