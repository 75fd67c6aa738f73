use soroban_sdk::{contracterror, contracttype, Address};

/// Storage keys for the contract.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Principal allowed to fund periods and sweep dust.
    Operator,
    /// Account that pre-authorizes the reward pull for every period.
    Treasury,
    /// SEP-41 token paid out as period rewards.
    FundingAsset,
    /// Stellar Asset Contract for native XLM held in custody.
    NativeAsset,
    /// Start timestamp of the open period; doubles as its identifier.
    PeriodStart,
    /// Stroops deposited by an account into a period.
    Deposit(Address, u64),
    /// Aggregate stroops deposited into a period.
    Pool(u64),
}

/// Payout a claim would produce right now.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimQuote {
    /// Native stroops returned to the depositor.
    pub principal: i128,
    /// Funding-asset units paid as the depositor's share of the reward pool.
    pub reward: i128,
}

/// Contract error codes. Auth failures surface as host panics from `require_auth`.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u32)]
pub enum VaultError {
    /// Deposit above the per-call ceiling.
    ExcessiveAmount = 1,
    /// Negative deposit amount.
    InvalidAmount = 2,
    /// Operator-only entry point called by someone else.
    Unauthorized = 3,
    /// The period has not run its full length yet.
    ReleaseNotReady = 4,
    /// Claim against a period nobody deposited into.
    EmptyPeriod = 5,
    /// Treasury allowance or balance cannot cover the period reward.
    FundingUnavailable = 6,
    /// Accumulation or payout math left the i128 range.
    ArithmeticOverflow = 7,
}
