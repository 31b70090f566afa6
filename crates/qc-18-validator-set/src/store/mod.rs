//! # Validator Store
//!
//! Typed access to the key-value port.
//!
//! ## Key Layout
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `v:` | owner | `ValidatorRecord` |
//! | `k:` | consensus key bytes | owner bytes |
//! | `c:` | `committee` | `CommitteeSnapshot` |
//!
//! Writes never go straight to the port. Operations stage them in a
//! `WriteSet` and `ValidatorStore::commit` applies the whole set as one
//! atomic batch, so records and the snapshot cannot drift apart.

use crate::domain::committee::PowerTable;
use crate::domain::entities::{CommitteeSnapshot, ValidatorRecord};
use crate::domain::errors::{ValidatorSetError, ValidatorSetResult};
use crate::ports::outbound::{BatchOperation, KeyValueStore, RecordSerializer};
use shared_types::{AccountKey, ConsensusKey};
use std::collections::{BTreeMap, BTreeSet};

/// Key namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Validator record: `v:{owner}` -> ValidatorRecord
    Validator,
    /// Consensus key index: `k:{key}` -> owner
    ConsensusKey,
    /// Committee singleton: `c:committee` -> CommitteeSnapshot
    Committee,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Validator => b"v:",
            KeyPrefix::ConsensusKey => b"k:",
            KeyPrefix::Committee => b"c:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    pub fn validator_key(owner: &AccountKey) -> Vec<u8> {
        KeyPrefix::Validator.key(owner.as_bytes())
    }

    pub fn consensus_key(key: &ConsensusKey) -> Vec<u8> {
        KeyPrefix::ConsensusKey.key(key.as_bytes())
    }

    pub fn committee_key() -> Vec<u8> {
        KeyPrefix::Committee.key(b"committee")
    }
}

/// Typed wrapper over a `KeyValueStore`.
pub struct ValidatorStore<KV, S> {
    kv: KV,
    serializer: S,
}

impl<KV: KeyValueStore, S: RecordSerializer> ValidatorStore<KV, S> {
    pub fn new(kv: KV, serializer: S) -> Self {
        Self { kv, serializer }
    }

    /// Underlying key-value store.
    pub fn kv(&self) -> &KV {
        &self.kv
    }

    pub fn record(&self, owner: &AccountKey) -> ValidatorSetResult<Option<ValidatorRecord>> {
        match self.kv.get(&KeyPrefix::validator_key(owner))? {
            Some(bytes) => Ok(Some(self.serializer.deserialize_record(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn snapshot(&self) -> ValidatorSetResult<Option<CommitteeSnapshot>> {
        match self.kv.get(&KeyPrefix::committee_key())? {
            Some(bytes) => Ok(Some(self.serializer.deserialize_snapshot(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Owner bound to `key`, if any.
    pub fn owner_of_key(&self, key: &ConsensusKey) -> ValidatorSetResult<Option<AccountKey>> {
        match self.kv.get(&KeyPrefix::consensus_key(key))? {
            Some(bytes) => {
                let owner = String::from_utf8(bytes).map_err(|e| {
                    ValidatorSetError::Serialization(format!("consensus key index: {e}"))
                })?;
                Ok(Some(AccountKey::new(owner)))
            }
            None => Ok(None),
        }
    }

    /// Every persisted record, active or not, ordered by owner.
    pub fn records(&self) -> ValidatorSetResult<Vec<ValidatorRecord>> {
        self.kv
            .prefix_scan(KeyPrefix::Validator.as_bytes())?
            .into_iter()
            .map(|(_, bytes)| {
                self.serializer
                    .deserialize_record(&bytes)
                    .map_err(ValidatorSetError::from)
            })
            .collect()
    }

    /// Start a write set over the persisted snapshot.
    pub fn begin(&self) -> ValidatorSetResult<WriteSet> {
        let snapshot = self.snapshot()?.ok_or(ValidatorSetError::NotInitialized)?;
        Ok(WriteSet::new(snapshot))
    }

    /// Apply a write set as one atomic batch.
    ///
    /// A changed snapshot gets its version bumped. An empty write set is a
    /// no-op.
    pub fn commit(&mut self, ws: WriteSet) -> ValidatorSetResult<()> {
        let operations = self.encode(ws)?;
        if operations.is_empty() {
            return Ok(());
        }
        tracing::debug!(writes = operations.len(), "committing validator set batch");
        self.kv.atomic_batch_write(operations)?;
        Ok(())
    }

    fn encode(&self, ws: WriteSet) -> ValidatorSetResult<Vec<BatchOperation>> {
        let mut operations = Vec::new();

        for owner in &ws.touched {
            if let Some(record) = ws.records.get(owner) {
                operations.push(BatchOperation::put(
                    KeyPrefix::validator_key(owner),
                    self.serializer.serialize_record(record)?,
                ));
            }
        }

        for (key, owner) in &ws.bindings {
            operations.push(BatchOperation::put(
                KeyPrefix::consensus_key(key),
                owner.as_bytes().to_vec(),
            ));
        }

        let changed = match &ws.original {
            Some(original) => *original != ws.snapshot,
            None => true,
        };
        if changed {
            let mut snapshot = ws.snapshot;
            snapshot.version = ws
                .original
                .as_ref()
                .map_or(snapshot.version, |o| o.version)
                .saturating_add(1);
            operations.push(BatchOperation::put(
                KeyPrefix::committee_key(),
                self.serializer.serialize_snapshot(&snapshot)?,
            ));
        }

        Ok(operations)
    }
}

/// Staged writes of one operation.
///
/// Records are read through the store on first access and cached, so an
/// operation sees its own writes.
#[derive(Debug, Clone)]
pub struct WriteSet {
    snapshot: CommitteeSnapshot,
    original: Option<CommitteeSnapshot>,
    records: BTreeMap<AccountKey, ValidatorRecord>,
    touched: BTreeSet<AccountKey>,
    bindings: BTreeMap<ConsensusKey, AccountKey>,
}

impl WriteSet {
    fn new(snapshot: CommitteeSnapshot) -> Self {
        Self {
            original: Some(snapshot.clone()),
            snapshot,
            records: BTreeMap::new(),
            touched: BTreeSet::new(),
            bindings: BTreeMap::new(),
        }
    }

    /// Write set that creates the snapshot from scratch.
    pub fn genesis() -> Self {
        Self {
            original: None,
            ..Self::new(CommitteeSnapshot::default())
        }
    }

    pub fn snapshot(&self) -> &CommitteeSnapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut CommitteeSnapshot {
        &mut self.snapshot
    }

    /// Replace the staged snapshot.
    pub fn put_snapshot(&mut self, snapshot: CommitteeSnapshot) {
        self.snapshot = snapshot;
    }

    fn load<KV: KeyValueStore, S: RecordSerializer>(
        &mut self,
        store: &ValidatorStore<KV, S>,
        owner: &AccountKey,
    ) -> ValidatorSetResult<()> {
        if !self.records.contains_key(owner) {
            if let Some(record) = store.record(owner)? {
                self.records.insert(owner.clone(), record);
            }
        }
        Ok(())
    }

    pub fn record<KV: KeyValueStore, S: RecordSerializer>(
        &mut self,
        store: &ValidatorStore<KV, S>,
        owner: &AccountKey,
    ) -> ValidatorSetResult<Option<&ValidatorRecord>> {
        self.load(store, owner)?;
        Ok(self.records.get(owner))
    }

    /// Mutable access; the record will be written on commit.
    pub fn record_mut<KV: KeyValueStore, S: RecordSerializer>(
        &mut self,
        store: &ValidatorStore<KV, S>,
        owner: &AccountKey,
    ) -> ValidatorSetResult<Option<&mut ValidatorRecord>> {
        self.load(store, owner)?;
        if self.records.contains_key(owner) {
            self.touched.insert(owner.clone());
        }
        Ok(self.records.get_mut(owner))
    }

    pub fn put_record(&mut self, record: ValidatorRecord) {
        self.touched.insert(record.owner.clone());
        self.records.insert(record.owner.clone(), record);
    }

    /// Stage a consensus key binding.
    pub fn bind_key(&mut self, key: ConsensusKey, owner: AccountKey) {
        self.bindings.insert(key, owner);
    }

    /// Owner bound to `key`, honouring staged bindings.
    pub fn owner_of_key<KV: KeyValueStore, S: RecordSerializer>(
        &self,
        store: &ValidatorStore<KV, S>,
        key: &ConsensusKey,
    ) -> ValidatorSetResult<Option<AccountKey>> {
        match self.bindings.get(key) {
            Some(owner) => Ok(Some(owner.clone())),
            None => store.owner_of_key(key),
        }
    }

    /// Current power of each owner in `owners`.
    pub fn powers<'a, KV, S, I>(
        &mut self,
        store: &ValidatorStore<KV, S>,
        owners: I,
    ) -> ValidatorSetResult<PowerTable>
    where
        KV: KeyValueStore,
        S: RecordSerializer,
        I: IntoIterator<Item = &'a AccountKey>,
    {
        let mut table = PowerTable::new();
        for owner in owners {
            let power = self.record(store, owner)?.map_or(0, |r| r.power());
            table.insert(owner.clone(), power);
        }
        Ok(table)
    }

    /// Nothing staged and the snapshot is unchanged.
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
            && self.bindings.is_empty()
            && self.original.as_ref() == Some(&self.snapshot)
    }
}
