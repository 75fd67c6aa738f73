//! Settlement engine: funding closed periods, pro-rata claims, dust sweeps.

use serde::{Deserialize, Serialize};

use super::Vault;
use crate::account::AccountId;
use crate::asset::AssetError;
use crate::error::LedgerError;
use crate::util::time_source::TimeSource;
use crate::{Amount, PeriodId};

/// How far a failed payout got before it stopped.
enum PayoutFailure {
    /// Nothing left custody, or everything that did was pulled back.
    RolledBack(LedgerError),
    /// Principal reached the claimant and could not be recovered.
    PrincipalStranded { reward: AssetError, undo: AssetError },
}

/// What a claim pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimQuote {
    /// Native deposit returned to the claimant.
    pub principal: Amount,
    /// Funding-asset share of the period reward.
    pub reward: Amount,
}

/// `floor(principal * reward_pool / total)`. `total` must be non-zero.
///
/// Truncation leaves at most `depositors - 1` units of dust per period.
pub(crate) fn proportional_reward(
    principal: Amount,
    total: Amount,
    reward_pool: Amount,
) -> Result<Amount, LedgerError> {
    principal
        .checked_mul(reward_pool)
        .and_then(|scaled| scaled.checked_div(total))
        .ok_or(LedgerError::ArithmeticOverflow("reward share"))
}

impl<T: TimeSource> Vault<T> {
    /// Close the open period and pull its reward from the treasury. Operator-only.
    ///
    /// Either both the period advance and the reward pull happen, or neither
    /// does. Returns the identifier of the newly opened period.
    pub fn fund_period(&mut self, caller: &AccountId) -> Result<PeriodId, LedgerError> {
        self.require_operator(caller)?;

        let now = self.time_source.now();
        let mut tracker = self.state.tracker.clone();
        let closed = tracker.close(now).inspect_err(|e| {
            tracing::debug!(error = %e, "Funding attempted before period end");
        })?;

        let required = self.config.reward_per_period();
        let allowance = self.funding.allowance(&self.treasury, &self.custody);
        let balance = self.funding.balance(&self.treasury);
        if allowance < required || balance < required {
            tracing::warn!(
                treasury = %self.treasury,
                required,
                allowance,
                balance,
                "Treasury cannot cover period reward"
            );
            return Err(LedgerError::FundingUnavailable {
                required,
                allowance,
                balance,
            });
        }

        self.funding
            .transfer_from(&self.custody, &self.treasury, &self.custody, required)?;
        let next = tracker.current();
        self.state.tracker = tracker;

        tracing::info!(
            closed,
            next,
            reward = required,
            pool = self.state.book.pool(closed),
            depositors = self.state.book.depositor_count(closed),
            overrun_secs = now - next,
            "Period funded"
        );

        Ok(next)
    }

    /// Preview what [`Vault::claim`] would pay without changing anything.
    ///
    /// An empty pool is reported before an open period, so identifiers that
    /// never saw a deposit (including future ones) fail as `EmptyPeriod`.
    pub fn claimable(&self, account: &AccountId, period: PeriodId) -> Result<ClaimQuote, LedgerError> {
        let total = self.state.book.pool(period);
        if total == 0 {
            return Err(LedgerError::EmptyPeriod { period });
        }
        if !self.state.tracker.is_closed(period) {
            return Err(LedgerError::PeriodOpen { period });
        }

        let principal = self.state.book.deposited_by(account, period);
        let reward = proportional_reward(principal, total, self.config.reward_per_period())?;
        Ok(ClaimQuote { principal, reward })
    }

    /// Withdraw principal plus the pro-rata reward for a closed period.
    ///
    /// The cell is zeroed before any transfer leaves custody; a repeated claim
    /// pays nothing and returns zero. Returns the reward paid.
    ///
    /// A rejected transfer restores the cell only when every leg that already
    /// moved was pulled back. If the principal cannot be recovered the cell
    /// stays zeroed, the unpaid reward remains in custody, and the call fails
    /// with [`LedgerError::PartialPayout`].
    pub fn claim(&mut self, caller: &AccountId, period: PeriodId) -> Result<Amount, LedgerError> {
        let quote = self.claimable(caller, period)?;

        let principal = self.state.book.take(caller, period);
        debug_assert_eq!(principal, quote.principal);

        match self.pay_out(caller, &quote) {
            Ok(()) => {}
            Err(PayoutFailure::RolledBack(e)) => {
                self.state.book.restore(caller, period, principal);
                tracing::warn!(claimant = %caller, period, error = %e, "Claim payout failed");
                return Err(e);
            }
            Err(PayoutFailure::PrincipalStranded { reward, undo }) => {
                tracing::error!(
                    claimant = %caller,
                    period,
                    principal,
                    unpaid_reward = quote.reward,
                    reward_error = %reward,
                    undo_error = %undo,
                    "Principal paid but reward rejected and not recoverable"
                );
                return Err(LedgerError::PartialPayout {
                    period,
                    principal,
                    unpaid_reward: quote.reward,
                    source: reward,
                });
            }
        }

        tracing::info!(
            claimant = %caller,
            period,
            principal = quote.principal,
            reward = quote.reward,
            "Claim settled"
        );

        Ok(quote.reward)
    }

    /// Send the whole funding-asset balance in custody to the treasury. Operator-only.
    pub fn sweep_dust(&mut self, caller: &AccountId) -> Result<Amount, LedgerError> {
        self.require_operator(caller)?;

        let amount = self.funding.balance(&self.custody);
        if amount > 0 {
            self.funding.transfer(&self.custody, &self.treasury, amount)?;
        }

        tracing::info!(treasury = %self.treasury, amount, "Swept funding balance");
        Ok(amount)
    }

    fn pay_out(&self, to: &AccountId, quote: &ClaimQuote) -> Result<(), PayoutFailure> {
        if quote.principal > 0 {
            self.native
                .transfer(&self.custody, to, quote.principal)
                .map_err(|e| PayoutFailure::RolledBack(e.into()))?;
        }
        if quote.reward > 0 {
            if let Err(reward) = self.funding.transfer(&self.custody, to, quote.reward) {
                if quote.principal > 0 {
                    if let Err(undo) = self.native.transfer(to, &self.custody, quote.principal) {
                        return Err(PayoutFailure::PrincipalStranded { reward, undo });
                    }
                }
                return Err(PayoutFailure::RolledBack(reward.into()));
            }
        }
        Ok(())
    }
}
