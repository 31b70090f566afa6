//! # qc-18-validator-set
//!
//! Validator Set Manager for Quantum-Chain.
//!
//! ## Architecture
//!
//! Keeps the registry of validator candidates and the bounded committee that
//! produces blocks. Committee membership is decided by voting power derived
//! from each candidate's deposit:
//!
//! ```text
//! ValidatorMsg ──→ [ValidatorHandler] ──┐
//!                                       ├──→ [ValidatorSetManager] ──→ KeyValueStore
//! BeginBlock/EndBlock ──→ [ConsensusHooks] ┘            │
//!                                                       └──→ Ledger (deposits)
//! ```
//!
//! ### Committee Rules
//!
//! - At most `max_committee_size` members are oncall.
//! - A full committee admits a candidate only if it is strictly stronger than
//!   the weakest member, who is evicted back into the waiting pool.
//! - Vacancies are refilled from the strongest waiting candidate.
//! - `end_block` emits the current power of every oncall member; members that
//!   left since the previous delta are reported with power 0.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use qc_18_validator_set::{ValidatorHandler, ValidatorMsg, ValidatorSetManager};
//!
//! let mut manager = ValidatorSetManager::new_in_memory(ledger, params);
//! manager.init_genesis()?;
//!
//! let result = ValidatorHandler::new(&mut manager).handle(&ctx, &msg);
//! let updates = ConsensusHooks::new(&mut manager).end_block(&ctx)?;
//! ```
//!
//! ## Persistence
//!
//! Every state change is staged in a `WriteSet` and flushed as one atomic
//! batch. Ledger transfers are applied before the flush and reversed if the
//! flush fails.

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod store;

// Re-export main types
pub use adapters::{BincodeRecordSerializer, InMemoryKVStore, InMemoryLedger, StaticParamSource};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use domain::{
    Admission, CommitteeSnapshot, Evidence, EvidenceKind, FireReport, PunishReason, Punishment,
    RemovalPolicy, SigningInfo, SigningReport, ValidatorParams, ValidatorRecord, ValidatorSetError,
    ValidatorSetResult, ValidatorUpdate, WithdrawRefusal,
};
pub use ipc::{BeginBlockInfo, BeginBlockOutcome, ConsensusHooks, ValidatorHandler, ValidatorMsg};
pub use ports::{KeyValueStore, Ledger, ParamSource, RecordSerializer, ValidatorSetApi};
pub use service::{ValidatorSetDependencies, ValidatorSetManager};
pub use store::ValidatorStore;
