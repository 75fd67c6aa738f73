//! Deposit ledger: per (account, period) balances and per-period aggregates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Vault;
use crate::account::AccountId;
use crate::error::LedgerError;
use crate::util::time_source::TimeSource;
use crate::{Amount, PeriodId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositBook {
    deposits: BTreeMap<PeriodId, BTreeMap<AccountId, Amount>>,
    pools: BTreeMap<PeriodId, Amount>,
}

/// A credit whose sums have been checked but not yet written.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StagedCredit {
    account: AccountId,
    period: PeriodId,
    balance: Amount,
    pool: Amount,
}

impl DepositBook {
    pub fn deposited_by(&self, account: &AccountId, period: PeriodId) -> Amount {
        self.deposits
            .get(&period)
            .and_then(|cells| cells.get(account))
            .copied()
            .unwrap_or(0)
    }

    /// Aggregate deposited into `period`. Zero for periods nobody used.
    pub fn pool(&self, period: PeriodId) -> Amount {
        self.pools.get(&period).copied().unwrap_or(0)
    }

    /// Distinct accounts that ever deposited into `period`, claimed or not.
    pub fn depositor_count(&self, period: PeriodId) -> usize {
        self.deposits.get(&period).map_or(0, BTreeMap::len)
    }

    pub(crate) fn stage_credit(
        &self,
        account: &AccountId,
        period: PeriodId,
        amount: Amount,
    ) -> Result<StagedCredit, LedgerError> {
        let balance = self
            .deposited_by(account, period)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("deposit balance"))?;
        let pool = self
            .pool(period)
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow("period pool"))?;
        Ok(StagedCredit {
            account: *account,
            period,
            balance,
            pool,
        })
    }

    pub(crate) fn commit(&mut self, credit: StagedCredit) {
        self.deposits
            .entry(credit.period)
            .or_default()
            .insert(credit.account, credit.balance);
        self.pools.insert(credit.period, credit.pool);
    }

    /// Zero the cell and return what it held. The pool is left untouched so it
    /// keeps serving as the payout denominator.
    pub(crate) fn take(&mut self, account: &AccountId, period: PeriodId) -> Amount {
        self.deposits
            .get_mut(&period)
            .and_then(|cells| cells.get_mut(account))
            .map(std::mem::take)
            .unwrap_or(0)
    }

    pub(crate) fn restore(&mut self, account: &AccountId, period: PeriodId, amount: Amount) {
        if let Some(cell) = self
            .deposits
            .get_mut(&period)
            .and_then(|cells| cells.get_mut(account))
        {
            *cell = amount;
        }
    }
}

impl<T: TimeSource> Vault<T> {
    /// Lock `amount` of the native asset from `caller` into the open period.
    ///
    /// Attribution is to whatever period is open at the time of the call,
    /// including one whose deadline has passed but which has not been funded
    /// yet. Returns the caller's new balance for that period.
    pub fn deposit(&mut self, caller: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        let ceiling = self.config.deposit_ceiling();
        if amount < 0 {
            tracing::debug!(depositor = %caller, amount, "Rejected negative deposit");
            return Err(LedgerError::InvalidAmount(amount));
        }
        if amount > ceiling {
            tracing::debug!(depositor = %caller, amount, ceiling, "Rejected deposit above ceiling");
            return Err(LedgerError::ExcessiveAmount { amount, ceiling });
        }

        let period = self.state.tracker.current();
        if amount == 0 {
            return Ok(self.state.book.deposited_by(caller, period));
        }

        let staged = self.state.book.stage_credit(caller, period, amount)?;
        self.native.transfer(caller, &self.custody, amount)?;
        self.state.book.commit(staged);

        tracing::info!(
            depositor = %caller,
            period,
            amount,
            balance = staged.balance,
            pool = staged.pool,
            "Deposit accepted"
        );

        Ok(staged.balance)
    }

    /// Plain payment into the vault. Same rules and result as [`Vault::deposit`].
    pub fn receive(&mut self, caller: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        self.deposit(caller, amount)
    }
}
