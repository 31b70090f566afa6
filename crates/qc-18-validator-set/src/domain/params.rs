//! Validator set parameters
//!
//! Read-only inputs supplied per block height by the `ParamSource` port.

use super::errors::{ValidatorSetError, ValidatorSetResult};
use serde::{Deserialize, Serialize};
use shared_types::Coin;

/// Default maximum committee size.
pub const MAX_COMMITTEE_SIZE: usize = 21;

/// Default number of missed blocks tolerated before a validator is fired.
pub const ABSENT_COMMIT_LIMIT: u64 = 100;

/// Validator set configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorParams {
    /// Upper bound on `oncall`.
    pub max_committee_size: usize,
    /// Minimum deposit to register, and the minimum a partial withdrawal may
    /// leave behind.
    pub min_commit_deposit: Coin,
    /// Smallest withdrawal accepted.
    pub min_withdraw: Coin,
    /// Penalty for Byzantine evidence.
    pub penalty_byzantine: Coin,
    /// Penalty for exceeding the absence limit.
    pub penalty_miss_commit: Coin,
    /// A validator with `absent_count` strictly above this is fired.
    pub absent_commit_limit: u64,
}

impl Default for ValidatorParams {
    fn default() -> Self {
        Self {
            max_committee_size: MAX_COMMITTEE_SIZE,
            min_commit_deposit: Coin::from_whole(1_000),
            min_withdraw: Coin::from_whole(1),
            penalty_byzantine: Coin::from_whole(1_000),
            penalty_miss_commit: Coin::from_whole(200),
            absent_commit_limit: ABSENT_COMMIT_LIMIT,
        }
    }
}

impl ValidatorParams {
    /// Small committee and short absence window for unit tests.
    pub fn for_testing() -> Self {
        Self {
            max_committee_size: 4,
            absent_commit_limit: 3,
            ..Self::default()
        }
    }

    /// Reject configurations the admission algorithm cannot work with.
    pub fn validate(&self) -> ValidatorSetResult<()> {
        if self.max_committee_size == 0 {
            return Err(ValidatorSetError::InvalidParams(
                "max_committee_size must be positive".to_string(),
            ));
        }
        if self.min_withdraw.is_zero() {
            return Err(ValidatorSetError::InvalidParams(
                "min_withdraw must be positive".to_string(),
            ));
        }
        if self.min_commit_deposit.to_power() == 0 {
            return Err(ValidatorSetError::InvalidParams(
                "min_commit_deposit must carry voting power".to_string(),
            ));
        }
        Ok(())
    }
}
