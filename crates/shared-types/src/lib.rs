//! # Shared Types Crate
//!
//! This crate contains the primitives every application module agrees on:
//! account identifiers, coin amounts, consensus keys, the per-block execution
//! context and the `TxResult` envelope returned to the host runtime.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-module types are defined here.
//! - **Determinism**: Every type has a total order or canonical encoding so
//!   that replicas iterate and serialize identically.
//! - **Envelope Integrity**: Modules never leak their internal error types to
//!   the host; they convert them into a `TxResult`.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::{ResultCode, TxResult};
pub use errors::*;
