//! # Test Fixtures
//!
//! A single-node chain driving the validator set through the same entry
//! points the host runtime uses: `ValidatorHandler` for transactions and
//! `ConsensusHooks` for block boundaries.

use std::collections::BTreeSet;
use std::sync::Arc;

use qc_18_validator_set::{
    BeginBlockInfo, BeginBlockOutcome, BincodeRecordSerializer, ConsensusHooks, InMemoryKVStore,
    InMemoryLedger, SigningInfo, StaticParamSource, ValidatorHandler, ValidatorMsg,
    ValidatorParams, ValidatorSetApi, ValidatorSetManager, ValidatorSetResult, ValidatorUpdate,
};
use shared_types::{AccountKey, BlockContext, Coin, ConsensusKey, TxResult};

pub type TestManager = ValidatorSetManager<
    InMemoryKVStore,
    BincodeRecordSerializer,
    InMemoryLedger,
    StaticParamSource,
>;

/// Opening balance of every funded account, in whole coins.
pub const INITIAL_BALANCE: u64 = 1_000_000;

pub fn account(i: usize) -> AccountKey {
    AccountKey::new(format!("validator{i}"))
}

pub fn consensus_key(i: usize) -> ConsensusKey {
    let mut bytes = [0xC5u8; 32];
    bytes[..8].copy_from_slice(&(i as u64).to_be_bytes());
    ConsensusKey::new(bytes)
}

pub struct TestChain {
    pub manager: TestManager,
    pub ledger: Arc<InMemoryLedger>,
    accounts: usize,
    height: u64,
}

impl TestChain {
    /// Chain at height 1 with `accounts` funded accounts `validator0..`.
    pub fn new(params: ValidatorParams, accounts: usize) -> ValidatorSetResult<Self> {
        let ledger = Arc::new(InMemoryLedger::with_balances(
            (0..accounts).map(|i| (account(i), Coin::from_whole(INITIAL_BALANCE))),
        ));
        let mut manager =
            ValidatorSetManager::new_in_memory(ledger.clone(), Arc::new(StaticParamSource::new(params)));
        manager.init_genesis()?;
        Ok(Self {
            manager,
            ledger,
            accounts,
            height: 1,
        })
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn ctx(&self) -> BlockContext {
        BlockContext::at_height(self.height)
    }

    pub fn submit(&mut self, msg: &ValidatorMsg) -> TxResult {
        let ctx = self.ctx();
        ValidatorHandler::new(&mut self.manager).handle(&ctx, msg)
    }

    pub fn deposit(&mut self, i: usize, whole: u64) -> TxResult {
        self.submit(&ValidatorMsg::Deposit {
            username: account(i),
            deposit: Coin::from_whole(whole),
            consensus_key: consensus_key(i),
            link: format!("https://validator{i}.example"),
        })
    }

    pub fn withdraw(&mut self, i: usize, whole: u64) -> TxResult {
        self.submit(&ValidatorMsg::Withdraw {
            username: account(i),
            amount: Coin::from_whole(whole),
        })
    }

    pub fn revoke(&mut self, i: usize) -> TxResult {
        self.submit(&ValidatorMsg::Revoke {
            username: account(i),
        })
    }

    /// Advance to the next height and run the begin-block hook.
    pub fn begin_block(&mut self, info: &BeginBlockInfo) -> ValidatorSetResult<BeginBlockOutcome> {
        self.height += 1;
        let ctx = self.ctx();
        ConsensusHooks::new(&mut self.manager).begin_block(&ctx, info)
    }

    pub fn end_block(&mut self) -> ValidatorSetResult<Vec<ValidatorUpdate>> {
        let ctx = self.ctx();
        ConsensusHooks::new(&mut self.manager).end_block(&ctx)
    }

    /// Signing flags for the current committee, with `absent` members
    /// reported as not having signed.
    pub fn signing(&self, absent: &BTreeSet<AccountKey>) -> ValidatorSetResult<Vec<SigningInfo>> {
        self.manager
            .oncall()?
            .into_iter()
            .map(|owner| {
                let key = self.manager.validator(&owner)?.consensus_key;
                Ok(if absent.contains(&owner) {
                    SigningInfo::absent(key)
                } else {
                    SigningInfo::signed(key)
                })
            })
            .collect()
    }

    pub fn oncall(&self) -> Vec<AccountKey> {
        self.manager.oncall().unwrap_or_default()
    }

    pub fn all(&self) -> Vec<AccountKey> {
        self.manager.all().unwrap_or_default()
    }

    /// Sum of ledger balances and deposits, in base units.
    pub fn circulating(&self) -> ValidatorSetResult<u128> {
        let balances: u128 = (0..self.accounts)
            .map(|i| self.ledger.balance(&account(i)).units())
            .sum();
        let deposits: u128 = self
            .manager
            .validators()?
            .iter()
            .map(|record| record.deposit.units())
            .sum();
        Ok(balances + deposits)
    }

    pub fn initial_supply(&self) -> u128 {
        Coin::from_whole(INITIAL_BALANCE).units() * self.accounts as u128
    }
}
