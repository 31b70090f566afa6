//! # Error Types
//!
//! Defines error types used across modules.

use crate::entities::{AccountKey, Coin};
use thiserror::Error;

/// Errors surfaced by a key-value store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },

    /// Key not found.
    #[error("Key not found in KV store")]
    NotFound,
}

/// Errors surfaced by an external ledger collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Account does not exist in the ledger.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountKey),

    /// Balance too low for a debit.
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: AccountKey,
        required: Coin,
        available: Coin,
    },

    /// Balance would overflow on credit.
    #[error("Balance overflow for {0}")]
    Overflow(AccountKey),

    /// Any other backend failure.
    #[error("Ledger backend error: {0}")]
    Backend(String),
}
