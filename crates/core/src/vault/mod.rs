//! The period vault ledger.
//!
//! ## Lifecycle
//!
//! Depositors lock native value into the open period. Once the period has run
//! its full length the operator calls [`Vault::fund_period`], which closes it
//! and pulls a fixed reward from the treasury. Depositors of a closed period
//! then [`Vault::claim`] their principal plus a pro-rata share of that reward.
//!
//! ## Atomicity
//!
//! Every operation validates first and writes last. State that must change
//! alongside an external transfer is staged (a cloned tracker, a checked
//! credit) and committed only once the transfer has gone through. The one
//! exception is `claim`, which zeroes the claimant's cell *before* paying out
//! and restores it if a transfer is rejected.
//!
//! A [`Vault`] takes `&mut self` for every mutation. Use
//! [`crate::SharedVault`] to serialize calls across threads.
//!
//! ## Operational risk
//!
//! A pending `fund_period` is visible to anyone watching the call queue. A
//! large deposit placed just before it captures a disproportionate share of
//! the closing period's reward. This is a property of the economics, not a
//! data race, and is not prevented here.

mod deposit;
mod period;
mod settlement;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::asset::TokenLedger;
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::util::time_source::{SystemTimeSource, TimeSource};
use crate::{Amount, PeriodId, Timestamp};

pub use deposit::DepositBook;
pub use period::PeriodTracker;
pub use settlement::ClaimQuote;

/// Accounts the vault is wired to at construction.
#[derive(Debug, Clone, Copy)]
pub struct VaultAccounts {
    /// Account holding the vault's custody balances on both asset ledgers.
    pub custody: AccountId,
    /// Principal allowed to fund periods and sweep dust. Usually the deployer.
    pub operator: AccountId,
    /// Account that pre-approves the reward pull for every period.
    pub treasury: AccountId,
}

/// Mutable ledger state: the period tracker and the deposit book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    tracker: PeriodTracker,
    book: DepositBook,
}

impl LedgerState {
    pub fn tracker(&self) -> &PeriodTracker {
        &self.tracker
    }

    pub fn book(&self) -> &DepositBook {
        &self.book
    }
}

pub struct Vault<T: TimeSource = SystemTimeSource> {
    config: LedgerConfig,
    custody: AccountId,
    operator: AccountId,
    treasury: AccountId,
    native: Arc<dyn TokenLedger>,
    funding: Arc<dyn TokenLedger>,
    time_source: T,
    state: LedgerState,
}

impl<T: TimeSource> Vault<T> {
    /// Create a vault whose first period opens now.
    pub fn new(
        config: LedgerConfig,
        accounts: VaultAccounts,
        native: Arc<dyn TokenLedger>,
        funding: Arc<dyn TokenLedger>,
        time_source: T,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        let start = time_source.now();

        tracing::info!(
            custody = %accounts.custody,
            operator = %accounts.operator,
            treasury = %accounts.treasury,
            period_start = start,
            period_length_secs = config.period_length_secs,
            "Vault created"
        );

        Ok(Self {
            state: LedgerState {
                tracker: PeriodTracker::new(start, config.period_length_secs),
                book: DepositBook::default(),
            },
            config,
            custody: accounts.custody,
            operator: accounts.operator,
            treasury: accounts.treasury,
            native,
            funding,
            time_source,
        })
    }

    /// Hand operator rights to `new_operator`. Operator-only.
    pub fn transfer_operator(
        &mut self,
        caller: &AccountId,
        new_operator: AccountId,
    ) -> Result<(), LedgerError> {
        self.require_operator(caller)?;
        tracing::info!(from = %self.operator, to = %new_operator, "Operator transferred");
        self.operator = new_operator;
        Ok(())
    }

    fn require_operator(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if *caller != self.operator {
            tracing::debug!(caller = %caller, "Rejected operator-only call");
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    pub fn current_period(&self) -> PeriodId {
        self.state.tracker.current()
    }

    /// Earliest time at which [`Vault::fund_period`] can succeed.
    pub fn period_ends_at(&self) -> Timestamp {
        self.state.tracker.ends_at()
    }

    pub fn deposited_by(&self, account: &AccountId, period: PeriodId) -> Amount {
        self.state.book.deposited_by(account, period)
    }

    pub fn period_reward_pool(&self, period: PeriodId) -> Amount {
        self.state.book.pool(period)
    }

    pub fn operator(&self) -> AccountId {
        self.operator
    }

    pub fn treasury(&self) -> AccountId {
        self.treasury
    }

    pub fn custody(&self) -> AccountId {
        self.custody
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }
}
