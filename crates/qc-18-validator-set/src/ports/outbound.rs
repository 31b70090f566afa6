//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the Validator Set service.
//!
//! These are the interfaces the host application implements. In-memory
//! implementations live in `crate::adapters`.

use crate::domain::entities::{CommitteeSnapshot, ValidatorRecord};
use crate::domain::errors::SerializationError;
use crate::domain::params::ValidatorParams;
use shared_types::{AccountKey, Coin, KVStoreError, LedgerError};

/// Abstract interface for key-value database operations.
///
/// Production: `RocksDbStore` (behind the `rocksdb` feature)
/// Testing: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Iterate over keys with a prefix, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Canonical encoding of persisted entities.
///
/// Every replica must produce identical bytes for identical values.
pub trait RecordSerializer: Send + Sync {
    fn serialize_record(&self, record: &ValidatorRecord) -> Result<Vec<u8>, SerializationError>;

    fn deserialize_record(&self, data: &[u8]) -> Result<ValidatorRecord, SerializationError>;

    fn serialize_snapshot(
        &self,
        snapshot: &CommitteeSnapshot,
    ) -> Result<Vec<u8>, SerializationError>;

    fn deserialize_snapshot(&self, data: &[u8]) -> Result<CommitteeSnapshot, SerializationError>;
}

/// Account balance bookkeeping owned by another module.
///
/// Deposits are debited from the owner's balance; withdrawals and refunds
/// are credited back. Failures abort the calling operation.
pub trait Ledger: Send + Sync {
    fn debit(&self, owner: &AccountKey, amount: Coin) -> Result<(), LedgerError>;

    fn credit(&self, owner: &AccountKey, amount: Coin) -> Result<(), LedgerError>;
}

/// Read-only parameter holder, versioned by block height.
pub trait ParamSource: Send + Sync {
    fn validator_params(&self, height: u64) -> Result<ValidatorParams, String>;
}
