//! # Quantum-Chain Subsystem Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | qc-18 Validator Set | Admission into full committee | < 1ms |
//! | qc-18 Validator Set | BeginBlock, 21 signers | < 1ms |
//! | qc-18 Validator Set | EndBlock delta | < 1ms |

use criterion::{criterion_group, criterion_main};
use qc_tests::benchmarks::qc_18_validator_set::register_benchmarks;

criterion_group!(benches, register_benchmarks);
criterion_main!(benches);
