//! Ledger error types.

use crate::account::AccountId;
use crate::asset::AssetError;
use crate::config::ConfigError;
use crate::{Amount, PeriodId, Timestamp};

/// Coarse classification of a [`LedgerError`], for callers that only need to
/// decide who is at fault and whether a retry can succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request breaks a deposit rule.
    PolicyViolation,
    /// The caller lacks operator rights.
    Unauthorized,
    /// The request came too early.
    TimingViolation,
    /// The request names a period with nothing in it.
    InvalidReference,
    /// An asset ledger refused or cannot cover a transfer.
    CollaboratorFailure,
    /// Amount math left the representable range.
    Arithmetic,
    /// The vault was built with unusable parameters.
    Configuration,
}

/// Every failure aborts the enclosing call with no state change, except
/// [`LedgerError::PartialPayout`], which reports a claim that settled its
/// principal but not its reward.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("deposit of {amount} exceeds the per-call ceiling of {ceiling}")]
    ExcessiveAmount { amount: Amount, ceiling: Amount },
    #[error("deposit amount must not be negative, got {0}")]
    InvalidAmount(Amount),
    #[error("{caller} is not the operator")]
    Unauthorized { caller: AccountId },
    #[error("period {period} cannot close before {ready_at} (now {now})")]
    ReleaseNotReady {
        period: PeriodId,
        ready_at: Timestamp,
        now: Timestamp,
    },
    #[error("period {period} is still open")]
    PeriodOpen { period: PeriodId },
    #[error("period {period} has no deposits")]
    EmptyPeriod { period: PeriodId },
    #[error("treasury cannot fund {required}: allowance {allowance}, balance {balance}")]
    FundingUnavailable {
        required: Amount,
        allowance: Amount,
        balance: Amount,
    },
    #[error("claim on period {period} paid principal {principal} but not reward {unpaid_reward}: {source}")]
    PartialPayout {
        period: PeriodId,
        principal: Amount,
        unpaid_reward: Amount,
        source: AssetError,
    },
    #[error("asset transfer rejected: {0}")]
    Asset(#[from] AssetError),
    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExcessiveAmount { .. } | Self::InvalidAmount(_) => ErrorKind::PolicyViolation,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::ReleaseNotReady { .. } | Self::PeriodOpen { .. } => ErrorKind::TimingViolation,
            Self::EmptyPeriod { .. } => ErrorKind::InvalidReference,
            Self::FundingUnavailable { .. } | Self::PartialPayout { .. } | Self::Asset(_) => {
                ErrorKind::CollaboratorFailure
            }
            Self::ArithmeticOverflow(_) => ErrorKind::Arithmetic,
            Self::Config(_) => ErrorKind::Configuration,
        }
    }
}
