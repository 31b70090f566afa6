//! # Committee Membership
//!
//! Bounded top-K selection over the registered pool.
//!
//! All functions here are pure: they mutate a `CommitteeSnapshot` given the
//! current power of every candidate and never touch storage. Powers are
//! supplied as a `BTreeMap` so that iteration never depends on hashing.
//!
//! ## Admission
//!
//! ```text
//! oncall not full           -> admit
//! oncall full, p > lowest   -> evict lowest (stays in All), admit
//! oncall full, p <= lowest  -> wait in All
//! ```
//!
//! Equal power never displaces an incumbent.

use super::entities::CommitteeSnapshot;
use shared_types::{AccountKey, Power};
use std::collections::BTreeMap;

/// Current power of every validator the operation may look at.
pub type PowerTable = BTreeMap<AccountKey, Power>;

fn power_of(powers: &PowerTable, owner: &AccountKey) -> Power {
    powers.get(owner).copied().unwrap_or(0)
}

/// Result of running admission for a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Candidate was already a committee member.
    AlreadyOncall,
    /// Candidate filled a free seat.
    Admitted,
    /// Candidate took the seat of the lowest-power member.
    Displaced { evicted: AccountKey },
    /// Candidate stays in the waiting pool.
    Waiting,
}

impl Admission {
    pub fn is_oncall(&self) -> bool {
        !matches!(self, Admission::Waiting)
    }
}

/// Result of removing a validator from active membership.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Removal {
    /// The validator held a committee seat.
    pub was_oncall: bool,
    /// Waiting member promoted into the freed seat.
    pub promoted: Option<AccountKey>,
}

/// Add `owner` to the pool if it is not there yet.
pub fn join_pool(snapshot: &mut CommitteeSnapshot, owner: &AccountKey) {
    if !snapshot.all.contains(owner) {
        snapshot.all.push(owner.clone());
    }
}

/// Recompute `lowest_power` / `lowest_validator` by scanning `oncall`.
///
/// The first member in `oncall` order holding the minimum wins.
pub fn refresh_lowest(snapshot: &mut CommitteeSnapshot, powers: &PowerTable) {
    let mut lowest: Option<(&AccountKey, Power)> = None;
    for member in &snapshot.oncall {
        let power = power_of(powers, member);
        match lowest {
            Some((_, current)) if power >= current => {}
            _ => lowest = Some((member, power)),
        }
    }

    match lowest {
        Some((member, power)) => {
            snapshot.lowest_validator = Some(member.clone());
            snapshot.lowest_power = power;
        }
        None => {
            snapshot.lowest_validator = None;
            snapshot.lowest_power = 0;
        }
    }
}

/// Evaluate `candidate` for a committee seat.
///
/// `candidate` must already be in `all`. A zero-power candidate never gets a
/// seat.
pub fn admit(
    snapshot: &mut CommitteeSnapshot,
    candidate: &AccountKey,
    powers: &PowerTable,
    max_committee_size: usize,
) -> Admission {
    if snapshot.oncall.contains(candidate) {
        refresh_lowest(snapshot, powers);
        return Admission::AlreadyOncall;
    }

    let power = power_of(powers, candidate);
    if power == 0 {
        return Admission::Waiting;
    }

    if snapshot.oncall.len() < max_committee_size {
        snapshot.oncall.push(candidate.clone());
        refresh_lowest(snapshot, powers);
        return Admission::Admitted;
    }

    // Member powers may have moved since the cache was written.
    refresh_lowest(snapshot, powers);
    let Some(lowest) = snapshot.lowest_validator.clone() else {
        return Admission::Waiting;
    };
    if power <= snapshot.lowest_power {
        return Admission::Waiting;
    }

    snapshot.oncall.retain(|member| member != &lowest);
    snapshot.oncall.push(candidate.clone());
    refresh_lowest(snapshot, powers);
    Admission::Displaced { evicted: lowest }
}

/// Highest-power waiting member, earliest in `all` on ties.
pub fn best_waiting(snapshot: &CommitteeSnapshot, powers: &PowerTable) -> Option<AccountKey> {
    let mut best: Option<(&AccountKey, Power)> = None;
    for owner in snapshot.all.iter().filter(|o| !snapshot.oncall.contains(o)) {
        let power = power_of(powers, owner);
        if power == 0 {
            continue;
        }
        match best {
            Some((_, current)) if power <= current => {}
            _ => best = Some((owner, power)),
        }
    }
    best.map(|(owner, _)| owner.clone())
}

/// Remove `owner` from `oncall` and `all`, refilling a freed seat.
pub fn remove(
    snapshot: &mut CommitteeSnapshot,
    owner: &AccountKey,
    powers: &PowerTable,
    max_committee_size: usize,
) -> Removal {
    let was_oncall = snapshot.oncall.contains(owner);
    snapshot.oncall.retain(|member| member != owner);
    snapshot.all.retain(|member| member != owner);

    let mut promoted = None;
    if was_oncall && snapshot.oncall.len() < max_committee_size {
        if let Some(next) = best_waiting(snapshot, powers) {
            snapshot.oncall.push(next.clone());
            promoted = Some(next);
        }
    }

    refresh_lowest(snapshot, powers);
    Removal {
        was_oncall,
        promoted,
    }
}

/// Check the membership invariants. Used by tests and debug assertions.
pub fn check_invariants(
    snapshot: &CommitteeSnapshot,
    powers: &PowerTable,
    max_committee_size: usize,
) -> Result<(), String> {
    if snapshot.oncall.len() > max_committee_size {
        return Err(format!(
            "oncall has {} members, max {}",
            snapshot.oncall.len(),
            max_committee_size
        ));
    }
    if let Some(stray) = snapshot.oncall.iter().find(|m| !snapshot.all.contains(m)) {
        return Err(format!("{stray} is oncall but not in all"));
    }

    let min = snapshot.oncall.iter().map(|m| power_of(powers, m)).min();
    match (&snapshot.lowest_validator, min) {
        (None, None) if snapshot.lowest_power == 0 => Ok(()),
        (Some(lowest), Some(min))
            if snapshot.oncall.contains(lowest)
                && snapshot.lowest_power == min
                && power_of(powers, lowest) == min =>
        {
            Ok(())
        }
        _ => Err(format!(
            "stale lowest cache: {:?} at {}, actual minimum {:?}",
            snapshot.lowest_validator, snapshot.lowest_power, min
        )),
    }
}
