//! # Validator Set Service
//!
//! Application service implementing `ValidatorSetApi`.
//!
//! Every mutating operation follows the same shape:
//!
//! ```text
//! params_at(height) -> begin() -> stage records/snapshot in a WriteSet
//!                   -> ledger debit/credit -> commit (one batch)
//! ```
//!
//! If the commit fails after the ledger moved coins, the movement is
//! reversed before the storage error is returned.

use crate::adapters::{BincodeRecordSerializer, InMemoryKVStore};
use crate::domain::committee::{self, Admission, Removal};
use crate::domain::delta;
use crate::domain::entities::{
    CommitteeSnapshot, Evidence, SigningInfo, ValidatorRecord, ValidatorUpdate,
};
use crate::domain::errors::{ValidatorSetError, ValidatorSetResult};
use crate::domain::legality;
use crate::domain::params::ValidatorParams;
use crate::domain::reports::{FireReport, PunishReason, Punishment, RemovalPolicy, SigningReport};
use crate::metrics;
use crate::ports::inbound::ValidatorSetApi;
use crate::ports::outbound::{KeyValueStore, Ledger, ParamSource, RecordSerializer};
use crate::store::{ValidatorStore, WriteSet};
use shared_types::{AccountKey, BlockContext, Coin, ConsensusKey, LedgerError, Power};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;


/// Ledger movement tied to one operation.
#[derive(Debug, Clone)]
enum Transfer {
    Debit(AccountKey, Coin),
    Credit(AccountKey, Coin),
}

impl Transfer {
    fn apply<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<(), LedgerError> {
        match self {
            Transfer::Debit(owner, amount) => ledger.debit(owner, *amount),
            Transfer::Credit(owner, amount) => ledger.credit(owner, *amount),
        }
    }

    fn reversed(&self) -> Transfer {
        match self {
            Transfer::Debit(owner, amount) => Transfer::Credit(owner.clone(), *amount),
            Transfer::Credit(owner, amount) => Transfer::Debit(owner.clone(), *amount),
        }
    }
}

/// Validator Set Manager
///
/// Sole mutator of validator records and the committee snapshot.
pub struct ValidatorSetManager<KV, S, L, P>
where
    KV: KeyValueStore,
    S: RecordSerializer,
    L: Ledger,
    P: ParamSource,
{
    store: ValidatorStore<KV, S>,
    ledger: Arc<L>,
    params: Arc<P>,
}

/// Dependencies for ValidatorSetManager
pub struct ValidatorSetDependencies<KV, S, L, P> {
    pub kv: KV,
    pub serializer: S,
    pub ledger: Arc<L>,
    pub params: Arc<P>,
}

impl<L: Ledger, P: ParamSource> ValidatorSetManager<InMemoryKVStore, BincodeRecordSerializer, L, P> {
    /// Manager over a fresh in-memory store.
    pub fn new_in_memory(ledger: Arc<L>, params: Arc<P>) -> Self {
        Self::new(ValidatorSetDependencies {
            kv: InMemoryKVStore::new(),
            serializer: BincodeRecordSerializer,
            ledger,
            params,
        })
    }
}

impl<KV, S, L, P> ValidatorSetManager<KV, S, L, P>
where
    KV: KeyValueStore,
    S: RecordSerializer,
    L: Ledger,
    P: ParamSource,
{
    pub fn new(deps: ValidatorSetDependencies<KV, S, L, P>) -> Self {
        Self {
            store: ValidatorStore::new(deps.kv, deps.serializer),
            ledger: deps.ledger,
            params: deps.params,
        }
    }

    pub fn store(&self) -> &ValidatorStore<KV, S> {
        &self.store
    }

    /// Parameters in force at `ctx.height`.
    pub fn params_at(&self, ctx: &BlockContext) -> ValidatorSetResult<ValidatorParams> {
        let params = self
            .params
            .validator_params(ctx.height)
            .map_err(ValidatorSetError::InvalidParams)?;
        params.validate()?;
        Ok(params)
    }

    /// Every persisted record, active or not, ordered by owner.
    pub fn validators(&self) -> ValidatorSetResult<Vec<ValidatorRecord>> {
        self.store.records()
    }

    /// Move coins, then flush the write set. Transfers already applied are
    /// reversed if a later transfer or the flush fails.
    fn settle(&mut self, ws: WriteSet, transfers: Vec<Transfer>) -> ValidatorSetResult<()> {
        let mut applied = Vec::with_capacity(transfers.len());
        for transfer in transfers {
            if let Err(err) = transfer.apply(self.ledger.as_ref()) {
                self.reverse(&applied);
                return Err(err.into());
            }
            applied.push(transfer);
        }

        if let Err(err) = self.store.commit(ws) {
            self.reverse(&applied);
            return Err(err);
        }
        Ok(())
    }

    fn reverse(&self, applied: &[Transfer]) {
        for transfer in applied.iter().rev() {
            if let Err(undo) = transfer.reversed().apply(self.ledger.as_ref()) {
                tracing::error!(
                    error = %undo,
                    transfer = ?transfer,
                    "failed to reverse ledger movement"
                );
            }
        }
    }

    fn refresh_cache(&self, ws: &mut WriteSet) -> ValidatorSetResult<()> {
        let oncall = ws.snapshot().oncall.clone();
        let powers = ws.powers(&self.store, &oncall)?;
        committee::refresh_lowest(ws.snapshot_mut(), &powers);
        Ok(())
    }

    fn admit_candidate(
        &self,
        ws: &mut WriteSet,
        owner: &AccountKey,
        params: &ValidatorParams,
    ) -> ValidatorSetResult<Admission> {
        committee::join_pool(ws.snapshot_mut(), owner);
        let members: Vec<AccountKey> = ws
            .snapshot()
            .oncall
            .iter()
            .chain(std::iter::once(owner))
            .cloned()
            .collect();
        let powers = ws.powers(&self.store, &members)?;
        let admission =
            committee::admit(ws.snapshot_mut(), owner, &powers, params.max_committee_size);
        debug_assert!(
            committee::check_invariants(ws.snapshot(), &powers, params.max_committee_size)
                .is_ok()
        );

        let power = powers.get(owner).copied().unwrap_or(0);
        match &admission {
            Admission::Admitted => {
                tracing::info!(owner = %owner, power, "validator admitted to committee");
                metrics::record_admission();
            }
            Admission::Displaced { evicted } => {
                tracing::info!(
                    owner = %owner,
                    evicted = %evicted,
                    power,
                    "validator displaced lowest committee member"
                );
                metrics::record_admission();
                metrics::record_eviction();
            }
            Admission::Waiting => {
                tracing::debug!(owner = %owner, power, "validator waiting for a seat");
            }
            Admission::AlreadyOncall => {}
        }
        Ok(admission)
    }

    fn remove_member(
        &self,
        ws: &mut WriteSet,
        owner: &AccountKey,
        params: &ValidatorParams,
        reason: &str,
    ) -> ValidatorSetResult<Removal> {
        let pool = ws.snapshot().all.clone();
        let powers = ws.powers(&self.store, &pool)?;
        let removal = committee::remove(ws.snapshot_mut(), owner, &powers, params.max_committee_size);

        tracing::info!(
            owner = %owner,
            reason,
            was_oncall = removal.was_oncall,
            promoted = ?removal.promoted,
            "validator left the active set"
        );
        metrics::record_removal(reason);
        if removal.promoted.is_some() {
            metrics::record_admission();
        }
        Ok(removal)
    }

    /// Slash `owner`. A removed validator gets its leftover deposit back
    /// through `transfers` and must register again to rejoin.
    #[allow(clippy::too_many_arguments)]
    fn punish_in(
        &self,
        ws: &mut WriteSet,
        owner: &AccountKey,
        penalty: Coin,
        policy: RemovalPolicy,
        reason: PunishReason,
        params: &ValidatorParams,
        transfers: &mut Vec<Transfer>,
    ) -> ValidatorSetResult<Punishment> {
        let active = ws.snapshot().all.contains(owner);
        let record = ws
            .record_mut(&self.store, owner)?
            .ok_or_else(|| ValidatorSetError::NotFound(owner.clone()))?;
        let taken = record.slash(penalty);
        let removed = active && (policy == RemovalPolicy::Remove || record.power() == 0);
        let refunded = if removed {
            std::mem::replace(&mut record.deposit, Coin::ZERO)
        } else {
            Coin::ZERO
        };
        let remaining = record.deposit;

        if !refunded.is_zero() {
            transfers.push(Transfer::Credit(owner.clone(), refunded));
        }
        let removal = if removed {
            Some(self.remove_member(ws, owner, params, reason.as_str())?)
        } else {
            if active {
                self.refresh_cache(ws)?;
            }
            None
        };

        tracing::warn!(
            owner = %owner,
            reason = reason.as_str(),
            penalty = %taken,
            refunded = %refunded,
            removed = removal.is_some(),
            "validator punished"
        );
        metrics::record_punishment(reason.as_str());

        Ok(Punishment {
            owner: owner.clone(),
            penalty: taken,
            remaining,
            refunded,
            removed: removal.is_some(),
            promoted: removal.and_then(|r| r.promoted),
        })
    }

    fn unknown_key(&self, key: &ConsensusKey, height: u64, source: &str) {
        tracing::warn!(
            consensus_key = %key,
            address = %key.address_hex(),
            height,
            source,
            "consensus key does not belong to any validator"
        );
        metrics::record_unknown_consensus_key();
    }
}

impl<KV, S, L, P> ValidatorSetApi for ValidatorSetManager<KV, S, L, P>
where
    KV: KeyValueStore,
    S: RecordSerializer,
    L: Ledger,
    P: ParamSource,
{
    fn init_genesis(&mut self) -> ValidatorSetResult<bool> {
        if self.store.snapshot()?.is_some() {
            return Ok(false);
        }
        self.store.commit(WriteSet::genesis())?;
        tracing::info!("validator set genesis written");
        Ok(true)
    }

    fn register(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        consensus_key: ConsensusKey,
        deposit: Coin,
        link: &str,
    ) -> ValidatorSetResult<Admission> {
        let params = self.params_at(ctx)?;
        let mut ws = self.store.begin()?;
        let record = match ws.record(&self.store, owner)?.cloned() {
            Some(existing) if !existing.deposit.is_zero() => {
                return Err(ValidatorSetError::DuplicateValidator(owner.clone()));
            }
            Some(existing) if existing.consensus_key != consensus_key => {
                return Err(ValidatorSetError::ConsensusKeyImmutable(owner.clone()));
            }
            Some(existing) => ValidatorRecord {
                deposit,
                absent_count: 0,
                link: link.to_string(),
                registered_at: ctx.height,
                ..existing
            },
            None => ValidatorRecord::new(
                owner.clone(),
                consensus_key,
                deposit,
                link.to_string(),
                ctx.height,
            ),
        };
        if deposit < params.min_commit_deposit {
            return Err(ValidatorSetError::InsufficientDeposit {
                required: params.min_commit_deposit,
                provided: deposit,
            });
        }

        match ws.owner_of_key(&self.store, &consensus_key)? {
            Some(bound) if bound != *owner => {
                return Err(ValidatorSetError::DuplicateConsensusKey {
                    key: consensus_key,
                    owner: bound,
                });
            }
            Some(_) => {}
            None => ws.bind_key(consensus_key, owner.clone()),
        }

        ws.put_record(record);
        let admission = self.admit_candidate(&mut ws, owner, &params)?;
        self.settle(ws, vec![Transfer::Debit(owner.clone(), deposit)])?;

        tracing::info!(
            owner = %owner,
            deposit = %deposit,
            height = ctx.height,
            oncall = admission.is_oncall(),
            "validator registered"
        );
        Ok(admission)
    }

    fn increase_deposit(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        amount: Coin,
    ) -> ValidatorSetResult<Admission> {
        let params = self.params_at(ctx)?;
        if amount.is_zero() {
            return Err(ValidatorSetError::InsufficientDeposit {
                required: Coin::from_units(1),
                provided: amount,
            });
        }

        let mut ws = self.store.begin()?;
        // Validators outside the pool rejoin through `register`.
        if !ws.snapshot().all.contains(owner) {
            return Err(ValidatorSetError::NotFound(owner.clone()));
        }
        let record = ws
            .record_mut(&self.store, owner)?
            .ok_or_else(|| ValidatorSetError::NotFound(owner.clone()))?;
        let new_deposit = record
            .deposit
            .checked_add(amount)
            .ok_or_else(|| ValidatorSetError::InvalidMsg(format!("deposit overflow for {owner}")))?;
        record.deposit = new_deposit;

        let admission = self.admit_candidate(&mut ws, owner, &params)?;
        self.settle(ws, vec![Transfer::Debit(owner.clone(), amount)])?;

        tracing::debug!(owner = %owner, amount = %amount, deposit = %new_deposit, "deposit increased");
        Ok(admission)
    }

    fn withdraw(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        amount: Coin,
    ) -> ValidatorSetResult<Coin> {
        let params = self.params_at(ctx)?;
        let mut ws = self.store.begin()?;
        let is_oncall = ws.snapshot().oncall.contains(owner);
        let record = ws
            .record_mut(&self.store, owner)?
            .ok_or_else(|| ValidatorSetError::NotFound(owner.clone()))?;

        let remaining = legality::check_withdraw(record.deposit, amount, is_oncall, &params)
            .map_err(|reason| ValidatorSetError::IllegalWithdraw {
                owner: owner.clone(),
                amount,
                reason,
            })?;
        record.deposit = remaining;

        if remaining.is_zero() && ws.snapshot().all.contains(owner) {
            self.remove_member(&mut ws, owner, &params, "withdraw")?;
        }
        self.settle(ws, vec![Transfer::Credit(owner.clone(), amount)])?;

        tracing::info!(owner = %owner, amount = %amount, remaining = %remaining, "deposit withdrawn");
        Ok(remaining)
    }

    fn revoke(&mut self, ctx: &BlockContext, owner: &AccountKey) -> ValidatorSetResult<Coin> {
        let params = self.params_at(ctx)?;
        let mut ws = self.store.begin()?;
        let record = ws
            .record_mut(&self.store, owner)?
            .ok_or_else(|| ValidatorSetError::NotFound(owner.clone()))?;
        let refund = record.deposit;
        if refund.is_zero() {
            return Err(ValidatorSetError::NotFound(owner.clone()));
        }
        record.deposit = Coin::ZERO;

        if ws.snapshot().all.contains(owner) {
            self.remove_member(&mut ws, owner, &params, "revoke")?;
        }
        self.settle(ws, vec![Transfer::Credit(owner.clone(), refund)])?;

        tracing::info!(owner = %owner, refund = %refund, "validator revoked");
        Ok(refund)
    }

    fn is_legal_withdraw(
        &self,
        ctx: &BlockContext,
        owner: &AccountKey,
        amount: Coin,
    ) -> ValidatorSetResult<bool> {
        let params = self.params_at(ctx)?;
        let snapshot = self.committee()?;
        let record = self.validator(owner)?;
        let is_oncall = snapshot.oncall.contains(owner);
        Ok(legality::check_withdraw(record.deposit, amount, is_oncall, &params).is_ok())
    }

    fn punish_oncall_validator(
        &mut self,
        ctx: &BlockContext,
        owner: &AccountKey,
        penalty: Coin,
        policy: RemovalPolicy,
    ) -> ValidatorSetResult<Punishment> {
        let params = self.params_at(ctx)?;
        let mut ws = self.store.begin()?;
        let mut transfers = Vec::new();
        let punishment = self.punish_in(
            &mut ws,
            owner,
            penalty,
            policy,
            PunishReason::Manual,
            &params,
            &mut transfers,
        )?;
        self.settle(ws, transfers)?;
        Ok(punishment)
    }

    fn update_signing_validators(
        &mut self,
        ctx: &BlockContext,
        signing: &[SigningInfo],
    ) -> ValidatorSetResult<SigningReport> {
        let mut ws = self.store.begin()?;
        let mut report = SigningReport::default();

        for info in signing {
            let owner = match ws.owner_of_key(&self.store, &info.consensus_key)? {
                Some(owner) => owner,
                None => {
                    self.unknown_key(&info.consensus_key, ctx.height, "signing");
                    report.unknown_keys.push(info.consensus_key);
                    continue;
                }
            };
            // Only committee members are accountable for signing.
            if !ws.snapshot().oncall.contains(&owner) {
                self.unknown_key(&info.consensus_key, ctx.height, "signing");
                report.unknown_keys.push(info.consensus_key);
                continue;
            }
            let Some(record) = ws.record_mut(&self.store, &owner)? else {
                self.unknown_key(&info.consensus_key, ctx.height, "signing");
                report.unknown_keys.push(info.consensus_key);
                continue;
            };

            if info.signed_last_block {
                record.produced_count = record.produced_count.saturating_add(1);
                report.signed += 1;
            } else {
                record.absent_count = record.absent_count.saturating_add(1);
                report.absent += 1;
            }
        }

        self.settle(ws, Vec::new())?;
        tracing::debug!(
            height = ctx.height,
            signed = report.signed,
            absent = report.absent,
            unknown = report.unknown_keys.len(),
            "signing flags applied"
        );
        Ok(report)
    }

    fn fire_incompetent_validators(
        &mut self,
        ctx: &BlockContext,
        evidence: &[Evidence],
    ) -> ValidatorSetResult<FireReport> {
        let params = self.params_at(ctx)?;
        let mut ws = self.store.begin()?;
        let mut report = FireReport::default();
        let mut punished = BTreeSet::new();
        let mut transfers = Vec::new();

        for item in evidence {
            let Some(owner) = ws.owner_of_key(&self.store, &item.consensus_key)? else {
                self.unknown_key(&item.consensus_key, item.height, "evidence");
                report.unknown_keys.push(item.consensus_key);
                continue;
            };
            if ws.record(&self.store, &owner)?.is_none() {
                self.unknown_key(&item.consensus_key, item.height, "evidence");
                report.unknown_keys.push(item.consensus_key);
                continue;
            }
            if !punished.insert(owner.clone()) {
                continue;
            }
            tracing::warn!(
                owner = %owner,
                kind = ?item.kind,
                evidence_height = item.height,
                height = ctx.height,
                "byzantine evidence received"
            );
            let punishment = self.punish_in(
                &mut ws,
                &owner,
                params.penalty_byzantine,
                RemovalPolicy::Remove,
                PunishReason::Byzantine,
                &params,
                &mut transfers,
            )?;
            report.punishments.push(punishment);
        }

        let oncall = ws.snapshot().oncall.clone();
        for owner in oncall {
            if punished.contains(&owner) {
                continue;
            }
            let absent = ws
                .record(&self.store, &owner)?
                .map_or(0, |record| record.absent_count);
            if absent <= params.absent_commit_limit {
                continue;
            }
            let punishment = self.punish_in(
                &mut ws,
                &owner,
                params.penalty_miss_commit,
                RemovalPolicy::Remove,
                PunishReason::MissCommit,
                &params,
                &mut transfers,
            )?;
            punished.insert(owner);
            report.punishments.push(punishment);
        }

        self.settle(ws, transfers)?;
        if !report.punishments.is_empty() {
            tracing::info!(
                height = ctx.height,
                fired = report.punishments.len(),
                total_penalty = %report.total_penalty(),
                "incompetent validators fired"
            );
        }
        Ok(report)
    }

    fn compute_committee_delta(
        &mut self,
        ctx: &BlockContext,
    ) -> ValidatorSetResult<Vec<ValidatorUpdate>> {
        let mut ws = self.store.begin()?;
        let members: Vec<AccountKey> = delta::delta_members(ws.snapshot())
            .into_iter()
            .cloned()
            .collect();

        let mut resolved: BTreeMap<AccountKey, (ConsensusKey, Power)> = BTreeMap::new();
        for owner in &members {
            match ws.record(&self.store, owner)? {
                Some(record) => {
                    resolved.insert(owner.clone(), (record.consensus_key, record.power()));
                }
                None => tracing::warn!(owner = %owner, "committee member has no record"),
            }
        }

        let updates = delta::compute_delta(ws.snapshot(), |owner| resolved.get(owner).copied());
        // The committee just reported becomes the next block's baseline.
        let next = CommitteeSnapshot {
            pre_block: ws.snapshot().oncall.clone(),
            ..ws.snapshot().clone()
        };
        ws.put_snapshot(next);
        self.settle(ws, Vec::new())?;

        metrics::record_delta_size(updates.len());
        tracing::debug!(height = ctx.height, entries = updates.len(), "committee delta computed");
        Ok(updates)
    }

    fn validator(&self, owner: &AccountKey) -> ValidatorSetResult<ValidatorRecord> {
        self.store
            .record(owner)?
            .ok_or_else(|| ValidatorSetError::NotFound(owner.clone()))
    }

    fn committee(&self) -> ValidatorSetResult<CommitteeSnapshot> {
        self.store.snapshot()?.ok_or(ValidatorSetError::NotInitialized)
    }

    fn is_validator_exist(&self, owner: &AccountKey) -> ValidatorSetResult<bool> {
        Ok(self.store.record(owner)?.is_some())
    }
}
