//! In-memory ledger.

use crate::ports::outbound::Ledger;
use parking_lot::RwLock;
use shared_types::{AccountKey, Coin, LedgerError};
use std::collections::BTreeMap;

/// Balance table behind a lock, for tests and single-process hosts.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: RwLock<BTreeMap<AccountKey, Coin>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger with opening balances.
    pub fn with_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (AccountKey, Coin)>,
    {
        Self {
            balances: RwLock::new(balances.into_iter().collect()),
        }
    }

    pub fn set_balance(&self, owner: &AccountKey, amount: Coin) {
        self.balances.write().insert(owner.clone(), amount);
    }

    /// Current balance, zero for unknown accounts.
    pub fn balance(&self, owner: &AccountKey) -> Coin {
        self.balances.read().get(owner).copied().unwrap_or(Coin::ZERO)
    }
}

impl Ledger for InMemoryLedger {
    fn debit(&self, owner: &AccountKey, amount: Coin) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let balance = balances
            .get_mut(owner)
            .ok_or_else(|| LedgerError::AccountNotFound(owner.clone()))?;
        let available = *balance;
        *balance = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: owner.clone(),
                required: amount,
                available,
            })?;
        Ok(())
    }

    fn credit(&self, owner: &AccountKey, amount: Coin) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let balance = balances.entry(owner.clone()).or_insert(Coin::ZERO);
        let current = *balance;
        *balance = current
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(owner.clone()))?;
        Ok(())
    }
}
