use soroban_sdk::{Address, Env};

use crate::types::DataKey;

/// Bump amount for persistent storage entries (roughly 30 days in ledgers).
const LEDGER_BUMP: u32 = 518_400;
/// Threshold for bumping (roughly 15 days).
const LEDGER_THRESHOLD: u32 = 259_200;

fn set_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, LEDGER_THRESHOLD, LEDGER_BUMP);
}

// =============================================================================
// Roles and assets
// =============================================================================

pub fn get_operator(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::Operator)
        .expect("operator not set")
}

pub fn set_operator(env: &Env, operator: &Address) {
    set_persistent(env, &DataKey::Operator, operator);
}

pub fn get_treasury(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::Treasury)
        .expect("treasury not set")
}

pub fn set_treasury(env: &Env, treasury: &Address) {
    set_persistent(env, &DataKey::Treasury, treasury);
}

pub fn get_funding_asset(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::FundingAsset)
        .expect("funding asset not set")
}

pub fn set_funding_asset(env: &Env, token: &Address) {
    set_persistent(env, &DataKey::FundingAsset, token);
}

pub fn get_native_asset(env: &Env) -> Address {
    env.storage()
        .persistent()
        .get(&DataKey::NativeAsset)
        .expect("native asset not set")
}

pub fn set_native_asset(env: &Env, token: &Address) {
    set_persistent(env, &DataKey::NativeAsset, token);
}

// =============================================================================
// Period tracker
// =============================================================================

pub fn get_period_start(env: &Env) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::PeriodStart)
        .expect("period start not set")
}

pub fn set_period_start(env: &Env, start: u64) {
    set_persistent(env, &DataKey::PeriodStart, &start);
}

// =============================================================================
// Deposit ledger
// =============================================================================

/// Stroops `depositor` holds in `period`; zero when no entry exists.
pub fn get_deposit(env: &Env, depositor: &Address, period: u64) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Deposit(depositor.clone(), period))
        .unwrap_or(0)
}

pub fn set_deposit(env: &Env, depositor: &Address, period: u64, amount: i128) {
    set_persistent(env, &DataKey::Deposit(depositor.clone(), period), &amount);
}

/// Aggregate stroops deposited into `period`; zero for unknown periods.
pub fn get_pool(env: &Env, period: u64) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Pool(period))
        .unwrap_or(0)
}

pub fn set_pool(env: &Env, period: u64, amount: i128) {
    set_persistent(env, &DataKey::Pool(period), &amount);
}
