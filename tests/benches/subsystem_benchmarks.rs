//! # Quantum-Chain Subsystem Benchmarks
//!
//! | Subsystem | Claim | Target |
//! |-----------|-------|--------|
//! | qc-18 Data Availability | Estimate 4k candidates | < 10ms |
//! | qc-18 Data Availability | Extend a 128x128 square | < 1s |
//! | qc-18 Data Availability | Validate a 1k-candidate proposal | < 2s |

use criterion::{criterion_group, criterion_main, Criterion};
use qc_tests::benchmarks::qc_18_data_availability;

fn bench_data_availability(c: &mut Criterion) {
    qc_18_data_availability::register_benchmarks(c);
}

criterion_group!(benches, bench_data_availability);
criterion_main!(benches);
