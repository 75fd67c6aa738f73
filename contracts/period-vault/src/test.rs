extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{StellarAssetClient, TokenClient},
    Address, Env,
};

use crate::{
    ClaimQuote, PeriodVault, PeriodVaultClient, VaultError, DEPOSIT_CEILING, PERIOD_LENGTH,
    REWARD_PER_PERIOD, UNIT,
};

/// Ledger time at which the vault is deployed in every test.
const GENESIS: u64 = 1_700_000_000;

struct Setup {
    env: Env,
    vault: PeriodVaultClient<'static>,
    operator: Address,
    treasury: Address,
    native: Address,
    funding: Address,
}

/// Deploy the vault with two test SACs: one standing in for native XLM and one
/// for the reward token. The treasury holds and approves ten periods of rewards.
fn setup() -> Setup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(GENESIS);

    let operator = Address::generate(&env);
    let treasury = Address::generate(&env);

    let native_admin = Address::generate(&env);
    let native = env
        .register_stellar_asset_contract_v2(native_admin)
        .address();
    let funding_admin = Address::generate(&env);
    let funding = env
        .register_stellar_asset_contract_v2(funding_admin)
        .address();

    let contract_id = env.register(PeriodVault, (&operator, &treasury, &funding, &native));
    let vault = PeriodVaultClient::new(&env, &contract_id);

    StellarAssetClient::new(&env, &funding).mint(&treasury, &(10 * REWARD_PER_PERIOD));
    approve_treasury(&env, &funding, &treasury, &contract_id, 10 * REWARD_PER_PERIOD);

    Setup {
        env,
        vault,
        operator,
        treasury,
        native,
        funding,
    }
}

fn approve_treasury(env: &Env, funding: &Address, treasury: &Address, vault: &Address, amount: i128) {
    let expiration = env.ledger().sequence() + 100_000;
    TokenClient::new(env, funding).approve(treasury, vault, &amount, &expiration);
}

fn balance(env: &Env, token: &Address, account: &Address) -> i128 {
    TokenClient::new(env, token).balance(account)
}

/// Create an account holding `units` whole native units.
fn funded_depositor(s: &Setup, units: i128) -> Address {
    let depositor = Address::generate(&s.env);
    StellarAssetClient::new(&s.env, &s.native).mint(&depositor, &(units * UNIT));
    depositor
}

fn advance_past_period(s: &Setup) {
    let ends_at = s.vault.period_ends_at();
    s.env.ledger().set_timestamp(ends_at);
}

// =============================================================================
// Constructor
// =============================================================================

#[test]
fn test_constructor_wires_roles_and_period() {
    let s = setup();
    assert_eq!(s.vault.operator(), s.operator);
    assert_eq!(s.vault.treasury(), s.treasury);
    assert_eq!(s.vault.funding_asset(), s.funding);
    assert_eq!(s.vault.native_asset(), s.native);
    assert_eq!(s.vault.current_period(), GENESIS);
    assert_eq!(s.vault.period_ends_at(), GENESIS + PERIOD_LENGTH);
}

// =============================================================================
// Deposit
// =============================================================================

#[test]
fn test_deposit_accrues_to_current_period() {
    let s = setup();
    let depositor = funded_depositor(&s, 40);

    assert_eq!(s.vault.deposit(&depositor, &(5 * UNIT)), 5 * UNIT);
    assert_eq!(s.vault.deposit(&depositor, &(15 * UNIT)), 20 * UNIT);

    assert_eq!(s.vault.deposited_by(&depositor, &GENESIS), 20 * UNIT);
    assert_eq!(s.vault.period_reward_pool(&GENESIS), 20 * UNIT);
    assert_eq!(balance(&s.env, &s.native, &depositor), 20 * UNIT);
    assert_eq!(balance(&s.env, &s.native, &s.vault.address), 20 * UNIT);
}

#[test]
fn test_deposit_at_ceiling_is_accepted() {
    let s = setup();
    let depositor = funded_depositor(&s, 20);
    s.vault.deposit(&depositor, &DEPOSIT_CEILING);
    assert_eq!(s.vault.period_reward_pool(&GENESIS), DEPOSIT_CEILING);
}

#[test]
fn test_deposit_over_ceiling_rejected() {
    let s = setup();
    let depositor = funded_depositor(&s, 21);

    let result = s.vault.try_deposit(&depositor, &(DEPOSIT_CEILING + 1));
    assert_eq!(result, Err(Ok(VaultError::ExcessiveAmount)));

    assert_eq!(s.vault.deposited_by(&depositor, &GENESIS), 0);
    assert_eq!(s.vault.period_reward_pool(&GENESIS), 0);
    assert_eq!(balance(&s.env, &s.native, &depositor), 21 * UNIT);
}

#[test]
fn test_deposit_negative_rejected() {
    let s = setup();
    let depositor = funded_depositor(&s, 1);
    let result = s.vault.try_deposit(&depositor, &-1);
    assert_eq!(result, Err(Ok(VaultError::InvalidAmount)));
}

#[test]
fn test_zero_deposit_changes_nothing() {
    let s = setup();
    let depositor = funded_depositor(&s, 1);
    assert_eq!(s.vault.deposit(&depositor, &0), 0);
    assert_eq!(s.vault.period_reward_pool(&GENESIS), 0);
    assert_eq!(balance(&s.env, &s.native, &depositor), UNIT);
}

#[test]
fn test_overdue_deposit_accrues_to_open_period() {
    let s = setup();
    let depositor = funded_depositor(&s, 10);

    // Deadline passed, operator has not funded yet.
    s.env.ledger().set_timestamp(GENESIS + PERIOD_LENGTH + 3 * 24 * 60 * 60);
    s.vault.deposit(&depositor, &(10 * UNIT));

    assert_eq!(s.vault.current_period(), GENESIS);
    assert_eq!(s.vault.deposited_by(&depositor, &GENESIS), 10 * UNIT);
}

// =============================================================================
// Fund period
// =============================================================================

#[test]
fn test_fund_period_advances_and_pulls_reward() {
    let s = setup();
    advance_past_period(&s);

    let next = s.vault.fund_period(&s.operator);

    assert_eq!(next, GENESIS + PERIOD_LENGTH);
    assert_eq!(s.vault.current_period(), GENESIS + PERIOD_LENGTH);
    assert_eq!(
        balance(&s.env, &s.funding, &s.vault.address),
        REWARD_PER_PERIOD
    );
    assert_eq!(
        balance(&s.env, &s.funding, &s.treasury),
        9 * REWARD_PER_PERIOD
    );
}

#[test]
fn test_fund_period_before_deadline_rejected() {
    let s = setup();
    s.env.ledger().set_timestamp(GENESIS + PERIOD_LENGTH - 1);

    let result = s.vault.try_fund_period(&s.operator);
    assert_eq!(result, Err(Ok(VaultError::ReleaseNotReady)));

    assert_eq!(s.vault.current_period(), GENESIS);
    assert_eq!(balance(&s.env, &s.funding, &s.vault.address), 0);
    assert_eq!(
        balance(&s.env, &s.funding, &s.treasury),
        10 * REWARD_PER_PERIOD
    );
}

#[test]
fn test_non_operator_cannot_fund() {
    let s = setup();
    advance_past_period(&s);
    let stranger = Address::generate(&s.env);

    let result = s.vault.try_fund_period(&stranger);
    assert_eq!(result, Err(Ok(VaultError::Unauthorized)));
    assert_eq!(s.vault.current_period(), GENESIS);
}

#[test]
fn test_late_funding_advances_one_period_only() {
    let s = setup();
    // Operator shows up ten days in.
    s.env.ledger().set_timestamp(GENESIS + PERIOD_LENGTH + 3 * 24 * 60 * 60);

    s.vault.fund_period(&s.operator);
    assert_eq!(s.vault.current_period(), GENESIS + PERIOD_LENGTH);

    // The new period still has to run its own seven days.
    let result = s.vault.try_fund_period(&s.operator);
    assert_eq!(result, Err(Ok(VaultError::ReleaseNotReady)));
}

#[test]
fn test_fund_period_without_allowance_leaves_period_open() {
    let s = setup();
    approve_treasury(&s.env, &s.funding, &s.treasury, &s.vault.address, 0);
    advance_past_period(&s);

    let result = s.vault.try_fund_period(&s.operator);
    assert_eq!(result, Err(Ok(VaultError::FundingUnavailable)));

    assert_eq!(s.vault.current_period(), GENESIS);
    assert_eq!(
        balance(&s.env, &s.funding, &s.treasury),
        10 * REWARD_PER_PERIOD
    );
}

#[test]
fn test_fund_period_with_short_treasury_rejected() {
    let s = setup();
    let drain = Address::generate(&s.env);
    TokenClient::new(&s.env, &s.funding).transfer(
        &s.treasury,
        &drain,
        &(10 * REWARD_PER_PERIOD - 1),
    );
    advance_past_period(&s);

    let result = s.vault.try_fund_period(&s.operator);
    assert_eq!(result, Err(Ok(VaultError::FundingUnavailable)));
    assert_eq!(s.vault.current_period(), GENESIS);
}

// =============================================================================
// Claim
// =============================================================================

#[test]
fn test_single_depositor_takes_whole_reward() {
    let s = setup();
    let depositor = funded_depositor(&s, 13);
    s.vault.deposit(&depositor, &(13 * UNIT));
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    let reward = s.vault.claim(&depositor, &GENESIS);

    assert_eq!(reward, REWARD_PER_PERIOD);
    assert_eq!(balance(&s.env, &s.funding, &depositor), REWARD_PER_PERIOD);
    assert_eq!(balance(&s.env, &s.native, &depositor), 13 * UNIT);
    assert_eq!(balance(&s.env, &s.funding, &s.vault.address), 0);
    assert_eq!(balance(&s.env, &s.native, &s.vault.address), 0);
    assert_eq!(s.vault.deposited_by(&depositor, &GENESIS), 0);
}

#[test]
fn test_rewards_split_pro_rata_with_bounded_dust() {
    let s = setup();
    let deposits = [7, 7, 7];
    let depositors: std::vec::Vec<Address> = deposits
        .iter()
        .map(|units| {
            let d = funded_depositor(&s, *units);
            s.vault.deposit(&d, &(units * UNIT));
            d
        })
        .collect();
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    let mut paid = 0;
    for (depositor, units) in depositors.iter().zip(deposits) {
        paid += s.vault.claim(depositor, &GENESIS);
        assert_eq!(balance(&s.env, &s.native, depositor), units * UNIT);
    }

    let dust = REWARD_PER_PERIOD - paid;
    assert!(paid <= REWARD_PER_PERIOD);
    assert!(dust <= (depositors.len() as i128) - 1);
    assert_eq!(balance(&s.env, &s.funding, &s.vault.address), dust);
}

#[test]
fn test_uneven_deposits_pay_proportionally() {
    let s = setup();
    let small = funded_depositor(&s, 5);
    let large = funded_depositor(&s, 15);
    s.vault.deposit(&small, &(5 * UNIT));
    s.vault.deposit(&large, &(15 * UNIT));
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    assert_eq!(s.vault.claim(&small, &GENESIS), REWARD_PER_PERIOD / 4);
    assert_eq!(s.vault.claim(&large, &GENESIS), REWARD_PER_PERIOD * 3 / 4);
}

#[test]
fn test_second_claim_pays_nothing() {
    let s = setup();
    let depositor = funded_depositor(&s, 10);
    s.vault.deposit(&depositor, &(10 * UNIT));
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    assert_eq!(s.vault.claim(&depositor, &GENESIS), REWARD_PER_PERIOD);
    assert_eq!(s.vault.claim(&depositor, &GENESIS), 0);
    assert_eq!(balance(&s.env, &s.funding, &depositor), REWARD_PER_PERIOD);
    assert_eq!(balance(&s.env, &s.native, &depositor), 10 * UNIT);
}

#[test]
fn test_claim_on_empty_period_rejected() {
    let s = setup();
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    let claimant = Address::generate(&s.env);
    let result = s.vault.try_claim(&claimant, &GENESIS);
    assert_eq!(result, Err(Ok(VaultError::EmptyPeriod)));

    let result = s.vault.try_claim(&claimant, &12_345);
    assert_eq!(result, Err(Ok(VaultError::EmptyPeriod)));
}

#[test]
fn test_claim_on_open_period_rejected() {
    let s = setup();
    let depositor = funded_depositor(&s, 10);
    s.vault.deposit(&depositor, &(10 * UNIT));

    let result = s.vault.try_claim(&depositor, &GENESIS);
    assert_eq!(result, Err(Ok(VaultError::ReleaseNotReady)));
    assert_eq!(s.vault.deposited_by(&depositor, &GENESIS), 10 * UNIT);
}

#[test]
fn test_non_depositor_claim_pays_zero() {
    let s = setup();
    let depositor = funded_depositor(&s, 10);
    s.vault.deposit(&depositor, &(10 * UNIT));
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    let outsider = Address::generate(&s.env);
    assert_eq!(s.vault.claim(&outsider, &GENESIS), 0);
    assert_eq!(
        balance(&s.env, &s.funding, &s.vault.address),
        REWARD_PER_PERIOD
    );
}

#[test]
fn test_claimable_matches_claim_without_mutating() {
    let s = setup();
    let depositor = funded_depositor(&s, 20);
    let other = funded_depositor(&s, 10);
    s.vault.deposit(&depositor, &(20 * UNIT));
    s.vault.deposit(&other, &(10 * UNIT));
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    let quote = s.vault.claimable(&depositor, &GENESIS);
    assert_eq!(
        quote,
        ClaimQuote {
            principal: 20 * UNIT,
            reward: 20 * UNIT * REWARD_PER_PERIOD / (30 * UNIT),
        }
    );
    assert_eq!(s.vault.deposited_by(&depositor, &GENESIS), 20 * UNIT);
    assert_eq!(s.vault.claim(&depositor, &GENESIS), quote.reward);
}

#[test]
fn test_periods_settle_independently() {
    let s = setup();
    let depositor = funded_depositor(&s, 20);

    s.vault.deposit(&depositor, &(4 * UNIT));
    advance_past_period(&s);
    let second = s.vault.fund_period(&s.operator);

    s.vault.deposit(&depositor, &(6 * UNIT));
    assert_eq!(s.vault.deposited_by(&depositor, &GENESIS), 4 * UNIT);
    assert_eq!(s.vault.deposited_by(&depositor, &second), 6 * UNIT);

    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    assert_eq!(s.vault.claim(&depositor, &second), REWARD_PER_PERIOD);
    assert_eq!(s.vault.claim(&depositor, &GENESIS), REWARD_PER_PERIOD);
    assert_eq!(balance(&s.env, &s.native, &depositor), 20 * UNIT);
}

// =============================================================================
// Sweep dust
// =============================================================================

#[test]
fn test_sweep_returns_dust_to_treasury() {
    let s = setup();
    for _ in 0..3 {
        let d = funded_depositor(&s, 1);
        s.vault.deposit(&d, &UNIT);
    }
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    // Nothing claimed yet, so the whole reward goes back.
    let swept = s.vault.sweep_dust(&s.operator);

    assert_eq!(swept, REWARD_PER_PERIOD);
    assert_eq!(balance(&s.env, &s.funding, &s.vault.address), 0);
    assert_eq!(
        balance(&s.env, &s.funding, &s.treasury),
        10 * REWARD_PER_PERIOD
    );
}

#[test]
fn test_sweep_after_all_claims_collects_rounding_dust() {
    let s = setup();
    let depositors: std::vec::Vec<Address> = (0..3)
        .map(|_| {
            let d = funded_depositor(&s, 1);
            s.vault.deposit(&d, &UNIT);
            d
        })
        .collect();
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    let paid: i128 = depositors
        .iter()
        .map(|d| s.vault.claim(d, &GENESIS))
        .sum();

    assert_eq!(s.vault.sweep_dust(&s.operator), REWARD_PER_PERIOD - paid);
}

#[test]
fn test_non_operator_cannot_sweep() {
    let s = setup();
    advance_past_period(&s);
    s.vault.fund_period(&s.operator);

    let stranger = Address::generate(&s.env);
    let result = s.vault.try_sweep_dust(&stranger);
    assert_eq!(result, Err(Ok(VaultError::Unauthorized)));
    assert_eq!(
        balance(&s.env, &s.funding, &s.vault.address),
        REWARD_PER_PERIOD
    );
}

// =============================================================================
// Operator transfer
// =============================================================================

#[test]
fn test_transfer_operator_moves_authority() {
    let s = setup();
    let successor = Address::generate(&s.env);
    s.vault.transfer_operator(&s.operator, &successor);
    assert_eq!(s.vault.operator(), successor);

    advance_past_period(&s);
    let result = s.vault.try_fund_period(&s.operator);
    assert_eq!(result, Err(Ok(VaultError::Unauthorized)));
    s.vault.fund_period(&successor);
}

#[test]
fn test_only_operator_can_transfer_operator() {
    let s = setup();
    let stranger = Address::generate(&s.env);
    let result = s.vault.try_transfer_operator(&stranger, &stranger);
    assert_eq!(result, Err(Ok(VaultError::Unauthorized)));
    assert_eq!(s.vault.operator(), s.operator);
}
