//! Withdrawal legality
//!
//! A withdrawal must leave either zero or at least `min_commit_deposit`
//! behind, and oncall members cannot withdraw at all.

use super::errors::WithdrawRefusal;
use super::params::ValidatorParams;
use shared_types::Coin;

/// Check whether `amount` may be withdrawn from `deposit`.
pub fn check_withdraw(
    deposit: Coin,
    amount: Coin,
    is_oncall: bool,
    params: &ValidatorParams,
) -> Result<Coin, WithdrawRefusal> {
    if is_oncall {
        return Err(WithdrawRefusal::Oncall);
    }
    if amount < params.min_withdraw {
        return Err(WithdrawRefusal::BelowMinimum);
    }
    let remaining = deposit
        .checked_sub(amount)
        .ok_or(WithdrawRefusal::ExceedsDeposit)?;
    if !remaining.is_zero() && remaining < params.min_commit_deposit {
        return Err(WithdrawRefusal::IllegalRemainder);
    }
    Ok(remaining)
}
