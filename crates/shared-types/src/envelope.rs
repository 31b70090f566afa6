//! # `TxResult` Envelope
//!
//! The result every module hands back to the host runtime for a transaction.
//!
//! ## Properties
//!
//! - **Stable codes**: each module owns a reserved code range; codes never
//!   change meaning once released because replicas compare them.
//! - **No partial state**: a non-OK envelope means the module left state
//!   untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric result code carried in a `TxResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ResultCode(pub u32);

impl ResultCode {
    /// Success.
    pub const OK: ResultCode = ResultCode(0);
    /// Message decoded but failed basic validation.
    pub const INVALID_MSG: ResultCode = ResultCode(313);

    // Validator module reserves 500 ~ 599.
    pub const VALIDATOR_MANAGER_FAILED: ResultCode = ResultCode(501);
    pub const VALIDATOR_STORAGE_FAILED: ResultCode = ResultCode(502);
    pub const VALIDATOR_NOT_FOUND: ResultCode = ResultCode(503);
    pub const VALIDATOR_DUPLICATE: ResultCode = ResultCode(504);
    pub const VALIDATOR_INSUFFICIENT_DEPOSIT: ResultCode = ResultCode(505);
    pub const VALIDATOR_ILLEGAL_WITHDRAW: ResultCode = ResultCode(506);
    pub const VALIDATOR_LEDGER_FAILED: ResultCode = ResultCode(507);

    pub fn is_ok(&self) -> bool {
        *self == Self::OK
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of executing one transaction message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TxResult {
    /// `ResultCode::OK` on success.
    pub code: ResultCode,
    /// Human-readable detail; empty on success.
    pub log: String,
}

impl TxResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn err(code: ResultCode, log: impl Into<String>) -> Self {
        Self {
            code,
            log: log.into(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }
}
