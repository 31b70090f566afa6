//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! - `storage`: `InMemoryKVStore`, `RocksDbStore` (feature `rocksdb`)
//! - `serializer`: `BincodeRecordSerializer`
//! - `ledger`: `InMemoryLedger`
//! - `params`: `StaticParamSource`

pub mod ledger;
pub mod params;
pub mod serializer;
pub mod storage;

pub use ledger::InMemoryLedger;
pub use params::StaticParamSource;
pub use serializer::BincodeRecordSerializer;
pub use storage::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use storage::{RocksDbConfig, RocksDbStore};
