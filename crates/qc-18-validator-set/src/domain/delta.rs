//! # Committee Delta
//!
//! Per-block set of power changes handed to the consensus engine.
//!
//! ```text
//! in Oncall and PreBlock  -> current power
//! in PreBlock only        -> power 0 (drop)
//! in Oncall only          -> current power
//! ```
//!
//! Entries are ordered by owner so every replica emits the same sequence.

use super::entities::{CommitteeSnapshot, ValidatorUpdate};
use shared_types::{AccountKey, ConsensusKey, Power};
use std::collections::BTreeSet;

/// Owners covered by the next delta, in emission order.
pub fn delta_members(snapshot: &CommitteeSnapshot) -> BTreeSet<&AccountKey> {
    snapshot.oncall.iter().chain(snapshot.pre_block.iter()).collect()
}

/// Build the delta for `snapshot`.
///
/// `lookup` returns the consensus key and current power of a member.
/// Members it cannot resolve are skipped.
pub fn compute_delta<F>(snapshot: &CommitteeSnapshot, mut lookup: F) -> Vec<ValidatorUpdate>
where
    F: FnMut(&AccountKey) -> Option<(ConsensusKey, Power)>,
{
    delta_members(snapshot)
        .into_iter()
        .filter_map(|owner| {
            let (consensus_key, power) = lookup(owner)?;
            let power = if snapshot.oncall.contains(owner) {
                power
            } else {
                0
            };
            Some(ValidatorUpdate {
                owner: owner.clone(),
                consensus_key,
                power,
            })
        })
        .collect()
}
