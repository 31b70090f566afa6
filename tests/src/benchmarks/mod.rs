//! # Quantum-Chain Benchmarks
//!
//! Performance benchmarks per subsystem.
