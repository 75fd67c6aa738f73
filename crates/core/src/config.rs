//! Vault parameters: period length, deposit ceiling, and per-period reward.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Amount;

/// Stroops per whole native unit. The reward token uses the same 7 decimals.
pub const UNIT: u64 = 10_000_000;

/// Seven days.
pub const DEFAULT_PERIOD_LENGTH_SECS: u64 = 7 * 24 * 60 * 60;
/// 20 native units per deposit call.
pub const DEFAULT_DEPOSIT_CEILING: u64 = 20 * UNIT;
/// 1000 funding-asset units per closed period.
pub const DEFAULT_REWARD_PER_PERIOD: u64 = 1_000 * UNIT;

/// Errors from loading or validating a [`LedgerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("period length must be at least one second")]
    ZeroPeriodLength,
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Ledger parameters. Amounts are in smallest units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Length of one deposit period in seconds.
    pub period_length_secs: u64,
    /// Largest native amount accepted by a single deposit.
    pub deposit_ceiling: u64,
    /// Funding-asset amount pulled from the treasury when a period closes.
    pub reward_per_period: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            period_length_secs: DEFAULT_PERIOD_LENGTH_SECS,
            deposit_ceiling: DEFAULT_DEPOSIT_CEILING,
            reward_per_period: DEFAULT_REWARD_PER_PERIOD,
        }
    }
}

impl LedgerConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Reads `PERIOD_VAULT_PERIOD_SECS`, `PERIOD_VAULT_DEPOSIT_CEILING` and
    /// `PERIOD_VAULT_REWARD`. Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_u64("PERIOD_VAULT_PERIOD_SECS") {
            config.period_length_secs = v;
        }
        if let Some(v) = env_u64("PERIOD_VAULT_DEPOSIT_CEILING") {
            config.deposit_ceiling = v;
        }
        if let Some(v) = env_u64("PERIOD_VAULT_REWARD") {
            config.reward_per_period = v;
        }

        config
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.period_length_secs == 0 {
            return Err(ConfigError::ZeroPeriodLength);
        }
        if self.deposit_ceiling == 0 {
            return Err(ConfigError::Zero("deposit_ceiling"));
        }
        if self.reward_per_period == 0 {
            return Err(ConfigError::Zero("reward_per_period"));
        }
        Ok(())
    }

    pub fn period_length(&self) -> Duration {
        Duration::from_secs(self.period_length_secs)
    }

    pub fn deposit_ceiling(&self) -> Amount {
        Amount::from(self.deposit_ceiling)
    }

    pub fn reward_per_period(&self) -> Amount {
        Amount::from(self.reward_per_period)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "Ignoring unparseable config value");
            None
        }
    }
}
