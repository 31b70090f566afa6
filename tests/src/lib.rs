//! # Quantum-Chain Test Suite
//!
//! Unified test crate for the validator set.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # TestChain: handler + hooks over an in-memory store
//! ├── benchmarks/       # Performance tests per subsystem
//! │   └── qc_18_validator_set.rs
//! │
//! └── integration/      # End-to-end flows and randomized invariants
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # Including the RocksDB backend
//! cargo test -p qc-tests --features rocksdb
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod benchmarks;
pub mod fixtures;
pub mod integration;
