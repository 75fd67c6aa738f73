//! Thread-safe handle to a [`Vault`].

use std::sync::Arc;

use parking_lot::RwLock;

use crate::account::AccountId;
use crate::asset::TokenLedger;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::util::time_source::{SystemTimeSource, TimeSource};
use crate::vault::{ClaimQuote, LedgerState, Vault, VaultAccounts};
use crate::{Amount, PeriodId, Timestamp};

/// Cloneable handle that serializes every mutation behind one write lock.
///
/// Each operation holds the lock for its whole validate, transfer and commit
/// sequence, so concurrent callers observe operations one at a time.
pub struct SharedVault<T: TimeSource = SystemTimeSource> {
    inner: Arc<RwLock<Vault<T>>>,
}

impl<T: TimeSource> Clone for SharedVault<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: TimeSource> From<Vault<T>> for SharedVault<T> {
    fn from(vault: Vault<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(vault)),
        }
    }
}

impl<T: TimeSource> SharedVault<T> {
    pub fn new(
        config: LedgerConfig,
        accounts: VaultAccounts,
        native: Arc<dyn TokenLedger>,
        funding: Arc<dyn TokenLedger>,
        time_source: T,
    ) -> Result<Self, LedgerError> {
        Vault::new(config, accounts, native, funding, time_source).map(Self::from)
    }

    pub fn deposit(&self, caller: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        self.inner.write().deposit(caller, amount)
    }

    pub fn receive(&self, caller: &AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        self.inner.write().receive(caller, amount)
    }

    pub fn fund_period(&self, caller: &AccountId) -> Result<PeriodId, LedgerError> {
        self.inner.write().fund_period(caller)
    }

    pub fn claim(&self, caller: &AccountId, period: PeriodId) -> Result<Amount, LedgerError> {
        self.inner.write().claim(caller, period)
    }

    pub fn sweep_dust(&self, caller: &AccountId) -> Result<Amount, LedgerError> {
        self.inner.write().sweep_dust(caller)
    }

    pub fn transfer_operator(
        &self,
        caller: &AccountId,
        new_operator: AccountId,
    ) -> Result<(), LedgerError> {
        self.inner.write().transfer_operator(caller, new_operator)
    }

    pub fn claimable(&self, account: &AccountId, period: PeriodId) -> Result<ClaimQuote, LedgerError> {
        self.inner.read().claimable(account, period)
    }

    pub fn current_period(&self) -> PeriodId {
        self.inner.read().current_period()
    }

    pub fn period_ends_at(&self) -> Timestamp {
        self.inner.read().period_ends_at()
    }

    pub fn deposited_by(&self, account: &AccountId, period: PeriodId) -> Amount {
        self.inner.read().deposited_by(account, period)
    }

    pub fn period_reward_pool(&self, period: PeriodId) -> Amount {
        self.inner.read().period_reward_pool(period)
    }

    pub fn operator(&self) -> AccountId {
        self.inner.read().operator()
    }

    /// Point-in-time copy of the ledger state.
    pub fn snapshot(&self) -> LedgerState {
        self.inner.read().state().clone()
    }

    /// Run `f` against the vault under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Vault<T>) -> R) -> R {
        f(&self.inner.read())
    }
}
