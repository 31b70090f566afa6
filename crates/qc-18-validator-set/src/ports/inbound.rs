//! # Inbound Ports (Driving Ports)
//!
//! The primary API for the Validator Set subsystem.
//!
//! Called by the transaction handler (`register`, `increase_deposit`,
//! `withdraw`, `revoke`) and by the host runtime once per block
//! (`update_signing_validators`, `fire_incompetent_validators`,
//! `compute_committee_delta`).

use crate::domain::committee::Admission;
use crate::domain::entities::{
    CommitteeSnapshot, Evidence, SigningInfo, ValidatorRecord, ValidatorUpdate,
};
use crate::domain::errors::ValidatorSetResult;
use crate::domain::reports::{FireReport, Punishment, RemovalPolicy, SigningReport};
use shared_types::{AccountKey, BlockContext, Coin, ConsensusKey};

/// Primary API for the Validator Set subsystem.
///
/// ## Atomicity
///
/// Every mutating call commits its record and snapshot writes in one batch.
/// On error nothing is persisted and no ledger movement is retained.
pub trait ValidatorSetApi {
    /// Write the empty committee snapshot if none exists.
    ///
    /// Returns `true` when the snapshot was created by this call.
    fn init_genesis(&mut self) -> ValidatorSetResult<bool>;

    /// Register `owner` with an initial deposit debited from the ledger.
    ///
    /// ## Errors
    ///
    /// - `InsufficientDeposit`: deposit below `min_commit_deposit`
    /// - `DuplicateValidator`: owner already holds a non-zero deposit
    /// - `DuplicateConsensusKey`: key already bound to another owner
    /// - `ConsensusKeyImmutable`: a returning owner presented a new key
    /// - `LedgerFailure`: debit failed
    fn register(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        consensus_key: ConsensusKey,
        deposit: Coin,
        link: &str,
    ) -> ValidatorSetResult<Admission>;

    /// Add `amount` to an existing deposit and re-run admission.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: owner is not in the pool (removed owners re-register)
    /// - `InsufficientDeposit`: zero amount
    /// - `LedgerFailure`: debit failed
    fn increase_deposit(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        amount: Coin,
    ) -> ValidatorSetResult<Admission>;

    /// Withdraw part or all of a waiting validator's deposit.
    ///
    /// Returns the remaining deposit. A validator withdrawing to zero leaves
    /// the pool.
    fn withdraw(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        amount: Coin,
    ) -> ValidatorSetResult<Coin>;

    /// Leave the validator set and receive the whole deposit back.
    ///
    /// Returns the refunded amount.
    fn revoke(&mut self, ctx: &BlockContext, owner: &AccountKey) -> ValidatorSetResult<Coin>;

    /// Dry-run of the withdrawal rules.
    fn is_legal_withdraw(
        &self,
        ctx: &BlockContext,
        owner: &AccountKey,
        amount: Coin,
    ) -> ValidatorSetResult<bool>;

    /// Slash `penalty` from `owner`'s deposit, flooring at zero.
    ///
    /// On removal the rest of the deposit is credited back to the owner.
    fn punish_oncall_validator(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        penalty: Coin,
        policy: RemovalPolicy,
    ) -> ValidatorSetResult<Punishment>;

    /// Apply the previous block's signed/absent flags to the counters.
    ///
    /// Never removes a validator. Keys that are unbound or belong to a
    /// validator outside `oncall` are skipped and reported.
    fn update_signing_validators(
        &mut self,
        ctx: &BlockContext,
        signing: &[SigningInfo],
    ) -> ValidatorSetResult<SigningReport>;

    /// Remove validators with Byzantine evidence or too many absences.
    fn fire_incompetent_validators(
        &mut self,
        ctx: &BlockContext,
        evidence: &[Evidence],
    ) -> ValidatorSetResult<FireReport>;

    /// Emit the committee delta and roll `pre_block` forward.
    fn compute_committee_delta(
        &mut self,
        ctx: &BlockContext,
    ) -> ValidatorSetResult<Vec<ValidatorUpdate>>;

    /// Read a single record.
    fn validator(&self, owner: &AccountKey) -> ValidatorSetResult<ValidatorRecord>;

    /// Read the full committee snapshot.
    fn committee(&self) -> ValidatorSetResult<CommitteeSnapshot>;

    /// Current committee members, in admission order.
    fn oncall(&self) -> ValidatorSetResult<Vec<AccountKey>> {
        Ok(self.committee()?.oncall)
    }

    /// Every active registration.
    fn all(&self) -> ValidatorSetResult<Vec<AccountKey>> {
        Ok(self.committee()?.all)
    }

    /// Whether a record exists for `owner`, active or not.
    fn is_validator_exist(&self, owner: &AccountKey) -> ValidatorSetResult<bool>;
}
