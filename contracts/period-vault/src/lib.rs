#![no_std]

mod storage;
mod types;

#[cfg(test)]
mod test;

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env};
pub use types::{ClaimQuote, VaultError};

/// Length of one deposit period in seconds (7 days).
pub const PERIOD_LENGTH: u64 = 7 * 24 * 60 * 60;
/// Stroops per whole unit; the reward token uses the same 7 decimals.
pub const UNIT: i128 = 10_000_000;
/// Largest deposit accepted in a single call.
pub const DEPOSIT_CEILING: i128 = 20 * UNIT;
/// Funding-asset units pulled from the treasury when a period closes.
pub const REWARD_PER_PERIOD: i128 = 1_000 * UNIT;

#[contract]
pub struct PeriodVault;

#[contractimpl]
impl PeriodVault {
    /// Initialize the vault. The first period opens at the current ledger time.
    pub fn __constructor(
        env: Env,
        operator: Address,
        treasury: Address,
        funding_asset: Address,
        native_asset: Address,
    ) {
        storage::set_operator(&env, &operator);
        storage::set_treasury(&env, &treasury);
        storage::set_funding_asset(&env, &funding_asset);
        storage::set_native_asset(&env, &native_asset);
        storage::set_period_start(&env, env.ledger().timestamp());
    }

    /// Lock native XLM into the open period.
    ///
    /// The deposit always counts toward whichever period is open when the
    /// call lands, including a period whose deadline has already passed but
    /// which the operator has not funded yet. Returns the depositor's new
    /// balance for that period.
    pub fn deposit(env: Env, depositor: Address, amount: i128) -> Result<i128, VaultError> {
        depositor.require_auth();
        if amount < 0 {
            return Err(VaultError::InvalidAmount);
        }
        if amount > DEPOSIT_CEILING {
            return Err(VaultError::ExcessiveAmount);
        }

        let period = storage::get_period_start(&env);
        if amount == 0 {
            return Ok(storage::get_deposit(&env, &depositor, period));
        }

        let balance = storage::get_deposit(&env, &depositor, period)
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        let pool = storage::get_pool(&env, period)
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;

        native_client(&env).transfer(&depositor, &env.current_contract_address(), &amount);

        storage::set_deposit(&env, &depositor, period, balance);
        storage::set_pool(&env, period, pool);

        env.events()
            .publish((symbol_short!("DEPOSIT"), depositor, period), amount);

        Ok(balance)
    }

    /// Close the open period and pull its reward from the treasury. Operator-only.
    ///
    /// The next period starts exactly one period length after the closed one,
    /// not at the current time. Returns the identifier of the new open period.
    pub fn fund_period(env: Env, caller: Address) -> Result<u64, VaultError> {
        caller.require_auth();
        require_operator(&env, &caller)?;

        let closed = storage::get_period_start(&env);
        let next = closed
            .checked_add(PERIOD_LENGTH)
            .ok_or(VaultError::ArithmeticOverflow)?;
        if env.ledger().timestamp() < next {
            return Err(VaultError::ReleaseNotReady);
        }

        let treasury = storage::get_treasury(&env);
        let vault = env.current_contract_address();
        let funding = funding_client(&env);
        if funding.allowance(&treasury, &vault) < REWARD_PER_PERIOD
            || funding.balance(&treasury) < REWARD_PER_PERIOD
        {
            return Err(VaultError::FundingUnavailable);
        }

        storage::set_period_start(&env, next);
        funding.transfer_from(&vault, &treasury, &vault, &REWARD_PER_PERIOD);

        env.events().publish(
            (symbol_short!("FUNDED"), closed),
            (REWARD_PER_PERIOD, next),
        );

        Ok(next)
    }

    /// Withdraw principal plus the pro-rata reward for a closed period.
    ///
    /// Returns the reward paid. A second claim for the same period pays
    /// nothing and returns zero.
    pub fn claim(env: Env, claimant: Address, period: u64) -> Result<i128, VaultError> {
        claimant.require_auth();

        let quote = quote(&env, &claimant, period)?;

        // The cell must be zero before any token leaves custody.
        storage::set_deposit(&env, &claimant, period, 0);

        let vault = env.current_contract_address();
        if quote.principal > 0 {
            native_client(&env).transfer(&vault, &claimant, &quote.principal);
        }
        if quote.reward > 0 {
            funding_client(&env).transfer(&vault, &claimant, &quote.reward);
        }

        env.events().publish(
            (symbol_short!("CLAIM"), claimant, period),
            (quote.principal, quote.reward),
        );

        Ok(quote.reward)
    }

    /// Send the vault's whole funding-asset balance back to the treasury. Operator-only.
    ///
    /// Rounding dust from truncated claims accumulates in custody until swept.
    pub fn sweep_dust(env: Env, caller: Address) -> Result<i128, VaultError> {
        caller.require_auth();
        require_operator(&env, &caller)?;

        let vault = env.current_contract_address();
        let treasury = storage::get_treasury(&env);
        let funding = funding_client(&env);
        let amount = funding.balance(&vault);
        if amount > 0 {
            funding.transfer(&vault, &treasury, &amount);
        }

        env.events()
            .publish((symbol_short!("SWEEP"), treasury), amount);

        Ok(amount)
    }

    /// Hand operator rights to a new address. Operator-only.
    pub fn transfer_operator(
        env: Env,
        caller: Address,
        new_operator: Address,
    ) -> Result<(), VaultError> {
        caller.require_auth();
        require_operator(&env, &caller)?;
        storage::set_operator(&env, &new_operator);

        env.events()
            .publish((symbol_short!("OPERATOR"), new_operator), ());

        Ok(())
    }

    /// Preview what `claim` would pay without touching state.
    pub fn claimable(env: Env, account: Address, period: u64) -> Result<ClaimQuote, VaultError> {
        quote(&env, &account, period)
    }

    pub fn current_period(env: Env) -> u64 {
        storage::get_period_start(&env)
    }

    /// Earliest ledger timestamp at which the open period can be funded.
    pub fn period_ends_at(env: Env) -> u64 {
        storage::get_period_start(&env).saturating_add(PERIOD_LENGTH)
    }

    pub fn deposited_by(env: Env, account: Address, period: u64) -> i128 {
        storage::get_deposit(&env, &account, period)
    }

    pub fn period_reward_pool(env: Env, period: u64) -> i128 {
        storage::get_pool(&env, period)
    }

    pub fn operator(env: Env) -> Address {
        storage::get_operator(&env)
    }

    pub fn treasury(env: Env) -> Address {
        storage::get_treasury(&env)
    }

    pub fn funding_asset(env: Env) -> Address {
        storage::get_funding_asset(&env)
    }

    pub fn native_asset(env: Env) -> Address {
        storage::get_native_asset(&env)
    }
}

fn require_operator(env: &Env, caller: &Address) -> Result<(), VaultError> {
    if *caller != storage::get_operator(env) {
        return Err(VaultError::Unauthorized);
    }
    Ok(())
}

/// Compute the payout for `account` in `period`.
///
/// An empty pool means nobody deposited (or the identifier is not a period
/// boundary) and is rejected before the open-period check, so unknown future
/// identifiers report `EmptyPeriod` as well.
fn quote(env: &Env, account: &Address, period: u64) -> Result<ClaimQuote, VaultError> {
    let total = storage::get_pool(env, period);
    if total == 0 {
        return Err(VaultError::EmptyPeriod);
    }
    if period >= storage::get_period_start(env) {
        return Err(VaultError::ReleaseNotReady);
    }

    let principal = storage::get_deposit(env, account, period);
    let reward = principal
        .checked_mul(REWARD_PER_PERIOD)
        .ok_or(VaultError::ArithmeticOverflow)?
        / total;

    Ok(ClaimQuote { principal, reward })
}

fn native_client(env: &Env) -> token::Client<'_> {
    token::Client::new(env, &storage::get_native_asset(env))
}

fn funding_client(env: &Env) -> token::Client<'_> {
    token::Client::new(env, &storage::get_funding_asset(env))
}
