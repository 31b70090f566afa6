//! Transaction handler for validator messages.
//!
//! Routes a closed set of message kinds to `ValidatorSetApi` calls and turns
//! the outcome into a `TxResult`.

use crate::domain::errors::{ValidatorSetError, ValidatorSetResult};
use crate::ports::inbound::ValidatorSetApi;
use serde::{Deserialize, Serialize};
use shared_types::{AccountKey, BlockContext, Coin, ConsensusKey, TxResult};

/// Shortest accepted username.
pub const MIN_USERNAME_LENGTH: usize = 3;
/// Longest accepted username.
pub const MAX_USERNAME_LENGTH: usize = 20;
/// Longest accepted validator link.
pub const MAX_LINK_LENGTH: usize = 100;

/// Validator transaction messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorMsg {
    /// Register, or top up an active registration.
    Deposit {
        username: AccountKey,
        deposit: Coin,
        consensus_key: ConsensusKey,
        link: String,
    },
    Withdraw {
        username: AccountKey,
        amount: Coin,
    },
    /// Leave the validator set and take the whole deposit back.
    Revoke { username: AccountKey },
}

impl ValidatorMsg {
    pub fn username(&self) -> &AccountKey {
        match self {
            ValidatorMsg::Deposit { username, .. }
            | ValidatorMsg::Withdraw { username, .. }
            | ValidatorMsg::Revoke { username } => username,
        }
    }

    /// Stateless checks run before touching any state.
    pub fn validate_basic(&self) -> ValidatorSetResult<()> {
        let username = self.username();
        if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&username.len()) {
            return Err(ValidatorSetError::InvalidMsg(format!(
                "illegal username length: {}",
                username.len()
            )));
        }

        match self {
            ValidatorMsg::Deposit { deposit, link, .. } => {
                if deposit.is_zero() {
                    return Err(ValidatorSetError::InvalidMsg(
                        "deposit must be positive".to_string(),
                    ));
                }
                if link.len() > MAX_LINK_LENGTH {
                    return Err(ValidatorSetError::InvalidMsg(format!(
                        "link exceeds {MAX_LINK_LENGTH} bytes"
                    )));
                }
            }
            ValidatorMsg::Withdraw { amount, .. } => {
                if amount.is_zero() {
                    return Err(ValidatorSetError::InvalidMsg(
                        "withdraw amount must be positive".to_string(),
                    ));
                }
            }
            ValidatorMsg::Revoke { .. } => {}
        }
        Ok(())
    }
}

/// Dispatches validator messages to the manager.
pub struct ValidatorHandler<'a, M> {
    manager: &'a mut M,
}

impl<'a, M: ValidatorSetApi> ValidatorHandler<'a, M> {
    pub fn new(manager: &'a mut M) -> Self {
        Self { manager }
    }

    /// Execute `msg` at `ctx`. Never panics; failures come back as a
    /// non-OK envelope with state unchanged.
    pub fn handle(&mut self, ctx: &BlockContext, msg: &ValidatorMsg) -> TxResult {
        match self.dispatch(ctx, msg) {
            Ok(()) => TxResult::ok(),
            Err(err) => {
                tracing::debug!(
                    username = %msg.username(),
                    code = %err.code(),
                    error = %err,
                    "validator message rejected"
                );
                TxResult::err(err.code(), err.to_string())
            }
        }
    }

    fn dispatch(&mut self, ctx: &BlockContext, msg: &ValidatorMsg) -> ValidatorSetResult<()> {
        msg.validate_basic()?;

        match msg {
            ValidatorMsg::Deposit {
                username,
                deposit,
                consensus_key,
                link,
            } => {
                if self.has_active_deposit(username)? {
                    self.manager.increase_deposit(ctx, username, *deposit)?;
                } else {
                    self.manager
                        .register(ctx, username, *consensus_key, *deposit, link)?;
                }
            }
            ValidatorMsg::Withdraw { username, amount } => {
                self.manager.withdraw(ctx, username, *amount)?;
            }
            ValidatorMsg::Revoke { username } => {
                self.manager.revoke(ctx, username)?;
            }
        }
        Ok(())
    }

    fn has_active_deposit(&self, username: &AccountKey) -> ValidatorSetResult<bool> {
        if !self.manager.is_validator_exist(username)? {
            return Ok(false);
        }
        Ok(!self.manager.validator(username)?.deposit.is_zero())
    }
}
