//! # Core Domain Entities
//!
//! Primitives shared by every application module.
//!
//! ## Clusters
//!
//! - **Accounts**: `AccountKey`
//! - **Money**: `Coin`, `DECIMALS`, `Power`
//! - **Consensus**: `ConsensusKey`, `ConsensusAddress`
//! - **Execution**: `BlockContext`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: ACCOUNTS
// =============================================================================

/// Stable, human-readable account identifier.
///
/// Ordering is lexicographic on the underlying string; modules rely on it for
/// deterministic iteration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct AccountKey(pub String);

impl AccountKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountKey {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for AccountKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

// =============================================================================
// CLUSTER B: MONEY
// =============================================================================

/// Number of base units in one whole coin.
pub const DECIMALS: u128 = 100_000;

/// Consensus-engine-visible voting weight.
pub type Power = u64;

/// A non-negative amount of coins, stored in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Coin(pub u128);

impl Coin {
    pub const ZERO: Coin = Coin(0);

    /// Amount expressed in base units.
    pub const fn from_units(units: u128) -> Self {
        Self(units)
    }

    /// Amount expressed in whole coins.
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole as u128 * DECIMALS)
    }

    pub const fn units(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Coin) -> Option<Coin> {
        self.0.checked_add(other.0).map(Coin)
    }

    pub fn checked_sub(self, other: Coin) -> Option<Coin> {
        self.0.checked_sub(other.0).map(Coin)
    }

    pub fn saturating_sub(self, other: Coin) -> Coin {
        Coin(self.0.saturating_sub(other.0))
    }

    /// Voting power derived from this amount.
    ///
    /// Monotonic integer division by `DECIMALS`; amounts below one whole coin
    /// carry no power.
    pub fn to_power(&self) -> Power {
        u64::try_from(self.0 / DECIMALS).unwrap_or(u64::MAX)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:05}", self.0 / DECIMALS, self.0 % DECIMALS)
    }
}

// =============================================================================
// CLUSTER C: CONSENSUS
// =============================================================================

/// 20-byte address the consensus engine derives from a consensus key.
pub type ConsensusAddress = [u8; 20];

/// Ed25519 public key used by the consensus engine to identify a validator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct ConsensusKey(pub [u8; 32]);

impl ConsensusKey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 20 bytes of `sha256(key)`.
    pub fn address(&self) -> ConsensusAddress {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(self.0);
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest[..20]);
        address
    }

    /// Hex form of `address()`, as shown by the consensus engine.
    pub fn address_hex(&self) -> String {
        hex::encode(self.address())
    }
}

impl fmt::Debug for ConsensusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConsensusKey({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for ConsensusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl From<[u8; 32]> for ConsensusKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// CLUSTER D: EXECUTION
// =============================================================================

/// Execution context of the block currently being processed.
///
/// Passed into every state-machine operation; parameters are looked up by
/// `height` so that upgrades take effect at the same block on every replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: u64,
}

impl BlockContext {
    pub fn at_height(height: u64) -> Self {
        Self { height }
    }
}
