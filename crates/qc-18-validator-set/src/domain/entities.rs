//! # Validator Set Entities
//!
//! Persisted records and per-block value objects.
//!
//! ## Persisted
//!
//! - `ValidatorRecord`: one per registered owner, never physically deleted
//! - `CommitteeSnapshot`: singleton describing committee membership
//!
//! ## Transient
//!
//! - `ValidatorUpdate`: one entry of the committee delta
//! - `SigningInfo`, `Evidence`: consensus engine inputs

use serde::{Deserialize, Serialize};
use shared_types::{AccountKey, Coin, ConsensusKey, Power};

/// A registered validator.
///
/// `deposit` is the source of truth for voting power. A record whose deposit
/// reaches zero stays in storage for audit but is excluded from every list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub owner: AccountKey,
    /// Immutable for the lifetime of the record.
    pub consensus_key: ConsensusKey,
    pub deposit: Coin,
    /// Cumulative blocks missed while oncall. Reset on re-activation.
    pub absent_count: u64,
    /// Cumulative blocks signed.
    pub produced_count: u64,
    /// Optional operator URL.
    pub link: String,
    /// Height of the block that (re)activated this record.
    pub registered_at: u64,
}

impl ValidatorRecord {
    pub fn new(
        owner: AccountKey,
        consensus_key: ConsensusKey,
        deposit: Coin,
        link: String,
        registered_at: u64,
    ) -> Self {
        Self {
            owner,
            consensus_key,
            deposit,
            absent_count: 0,
            produced_count: 0,
            link,
            registered_at,
        }
    }

    pub fn power(&self) -> Power {
        self.deposit.to_power()
    }

    /// Subtract `penalty` from the deposit, flooring at zero.
    ///
    /// Returns the amount actually taken.
    pub fn slash(&mut self, penalty: Coin) -> Coin {
        let taken = penalty.min(self.deposit);
        self.deposit = self.deposit.saturating_sub(taken);
        taken
    }
}

/// Committee membership singleton.
///
/// Invariants:
/// - `oncall.len() <= max_committee_size`
/// - every member of `oncall` is in `all`
/// - `lowest_validator` is the first member of `oncall` (in order) holding
///   the minimum power, `lowest_power` is that power; both are empty when
///   `oncall` is empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CommitteeSnapshot {
    /// Bumped on every persisted change.
    pub version: u64,
    /// Validators currently empowered to produce and vote, in admission order.
    pub oncall: Vec<AccountKey>,
    /// Every active registration: oncall plus the waiting pool.
    pub all: Vec<AccountKey>,
    /// `oncall` as of the end of the previous block.
    pub pre_block: Vec<AccountKey>,
    pub lowest_power: Power,
    pub lowest_validator: Option<AccountKey>,
}

/// One entry of the per-block committee delta.
///
/// `power == 0` instructs the consensus engine to drop the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub owner: AccountKey,
    pub consensus_key: ConsensusKey,
    pub power: Power,
}

/// Whether a committee member signed the previous block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningInfo {
    pub consensus_key: ConsensusKey,
    pub signed_last_block: bool,
}

impl SigningInfo {
    pub fn signed(consensus_key: ConsensusKey) -> Self {
        Self {
            consensus_key,
            signed_last_block: true,
        }
    }

    pub fn absent(consensus_key: ConsensusKey) -> Self {
        Self {
            consensus_key,
            signed_last_block: false,
        }
    }
}

/// Kind of protocol violation reported by the consensus engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceKind {
    DuplicateVote,
    LightClientAttack,
}

/// Proof of Byzantine behaviour, already verified by the consensus engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub consensus_key: ConsensusKey,
    /// Height at which the violation happened.
    pub height: u64,
    pub kind: EvidenceKind,
}

impl Evidence {
    pub fn duplicate_vote(consensus_key: ConsensusKey, height: u64) -> Self {
        Self {
            consensus_key,
            height,
            kind: EvidenceKind::DuplicateVote,
        }
    }
}
