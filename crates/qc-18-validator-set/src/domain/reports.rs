//! Outcomes of punishment and per-block hooks.

use serde::{Deserialize, Serialize};
use shared_types::{AccountKey, Coin, ConsensusKey};

/// Whether a punished validator loses its membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    /// Remove from `oncall` and `all` regardless of remaining power.
    Remove,
    /// Keep membership while power stays positive.
    KeepIfPowered,
}

/// Why a validator was punished. Used for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PunishReason {
    Byzantine,
    MissCommit,
    Manual,
}

impl PunishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunishReason::Byzantine => "byzantine",
            PunishReason::MissCommit => "miss_commit",
            PunishReason::Manual => "manual",
        }
    }
}

/// Result of a single punishment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Punishment {
    pub owner: AccountKey,
    /// Amount actually taken from the deposit, at most the deposit.
    pub penalty: Coin,
    /// Deposit left on the record. Zero once the validator is removed.
    pub remaining: Coin,
    /// Leftover deposit credited back to the owner on removal.
    pub refunded: Coin,
    /// Validator lost its membership.
    pub removed: bool,
    /// Waiting member promoted into the freed seat.
    pub promoted: Option<AccountKey>,
}

/// Result of applying one block's signing flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SigningReport {
    pub signed: usize,
    pub absent: usize,
    /// Keys that resolve to no oncall validator.
    pub unknown_keys: Vec<ConsensusKey>,
}

/// Result of firing Byzantine and chronically absent validators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FireReport {
    /// Punishments in the order they were applied.
    pub punishments: Vec<Punishment>,
    /// Evidence keys that resolve to no registered validator.
    pub unknown_keys: Vec<ConsensusKey>,
}

impl FireReport {
    /// Owners affected by this call, in application order.
    pub fn fired(&self) -> Vec<AccountKey> {
        self.punishments.iter().map(|p| p.owner.clone()).collect()
    }

    /// Sum of all penalties taken.
    pub fn total_penalty(&self) -> Coin {
        self.punishments
            .iter()
            .fold(Coin::ZERO, |acc, p| Coin::from_units(acc.units().saturating_add(p.penalty.units())))
    }
}
