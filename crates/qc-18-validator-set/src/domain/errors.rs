//! # Domain Errors
//!
//! Error types for the Validator Set subsystem.
//!
//! Every variant maps to a stable `ResultCode` in the 500 ~ 599 range so the
//! transaction handler can report it to the host without string matching.

use shared_types::{AccountKey, Coin, ConsensusKey, KVStoreError, LedgerError, ResultCode};

/// Why a withdrawal request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawRefusal {
    /// Validator is oncall and must leave the committee first.
    Oncall,
    /// Amount is smaller than `min_withdraw`.
    BelowMinimum,
    /// Amount is larger than the deposit.
    ExceedsDeposit,
    /// Remainder is positive but below `min_commit_deposit`.
    IllegalRemainder,
}

impl std::fmt::Display for WithdrawRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            WithdrawRefusal::Oncall => "validator is oncall",
            WithdrawRefusal::BelowMinimum => "amount below minimum withdraw",
            WithdrawRefusal::ExceedsDeposit => "amount exceeds deposit",
            WithdrawRefusal::IllegalRemainder => "remaining deposit below minimum commitment",
        };
        f.write_str(reason)
    }
}

/// Encoding or decoding of a persisted entity failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationError {
    pub message: String,
}

impl std::fmt::Display for SerializationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Serialization failed: {}", self.message)
    }
}

impl std::error::Error for SerializationError {}

/// Validator Set error types.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorSetError {
    #[error("Validator not found: {0}")]
    NotFound(AccountKey),

    #[error("Validator already registered: {0}")]
    DuplicateValidator(AccountKey),

    #[error("Consensus key {key} already bound to {owner}")]
    DuplicateConsensusKey { key: ConsensusKey, owner: AccountKey },

    #[error("Consensus key of {0} cannot change")]
    ConsensusKeyImmutable(AccountKey),

    #[error("Insufficient deposit: required {required}, provided {provided}")]
    InsufficientDeposit { required: Coin, provided: Coin },

    #[error("Illegal withdraw of {amount} by {owner}: {reason}")]
    IllegalWithdraw {
        owner: AccountKey,
        amount: Coin,
        reason: WithdrawRefusal,
    },

    #[error("Ledger error: {0}")]
    LedgerFailure(#[from] LedgerError),

    #[error("Invalid message: {0}")]
    InvalidMsg(String),

    #[error("Validator set not initialized")]
    NotInitialized,

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ValidatorSetError {
    /// Stable result code reported in the transaction envelope.
    pub fn code(&self) -> ResultCode {
        match self {
            ValidatorSetError::NotFound(_) => ResultCode::VALIDATOR_NOT_FOUND,
            ValidatorSetError::DuplicateValidator(_)
            | ValidatorSetError::DuplicateConsensusKey { .. }
            | ValidatorSetError::ConsensusKeyImmutable(_) => ResultCode::VALIDATOR_DUPLICATE,
            ValidatorSetError::InsufficientDeposit { .. } => {
                ResultCode::VALIDATOR_INSUFFICIENT_DEPOSIT
            }
            ValidatorSetError::IllegalWithdraw { .. } => ResultCode::VALIDATOR_ILLEGAL_WITHDRAW,
            ValidatorSetError::LedgerFailure(_) => ResultCode::VALIDATOR_LEDGER_FAILED,
            ValidatorSetError::InvalidMsg(_) => ResultCode::INVALID_MSG,
            ValidatorSetError::NotInitialized | ValidatorSetError::InvalidParams(_) => {
                ResultCode::VALIDATOR_MANAGER_FAILED
            }
            ValidatorSetError::Storage(_) | ValidatorSetError::Serialization(_) => {
                ResultCode::VALIDATOR_STORAGE_FAILED
            }
        }
    }
}

impl From<SerializationError> for ValidatorSetError {
    fn from(err: SerializationError) -> Self {
        ValidatorSetError::Serialization(err.message)
    }
}

/// Result type for Validator Set operations.
pub type ValidatorSetResult<T> = Result<T, ValidatorSetError>;
