//! Host-side period vault.
//!
//! Depositors lock a native asset into fixed-length periods. When a period
//! ends, the operator funds it with a fixed reward pulled from a treasury
//! allowance, and each depositor of that period can then withdraw their
//! principal together with a share of the reward proportional to what they
//! deposited.
//!
//! The same rules run on-chain in the `period-vault-contract` Soroban
//! contract. This crate hosts them off-chain behind the [`TokenLedger`]
//! abstraction so they can be embedded, simulated and tested without a
//! ledger.
//!
//! ```no_run
//! use std::sync::Arc;
//! use period_vault::{AccountId, InMemoryToken, LedgerConfig, SharedVault, SystemTimeSource, VaultAccounts};
//!
//! # fn main() -> Result<(), period_vault::LedgerError> {
//! let native = InMemoryToken::new();
//! let funding = InMemoryToken::new();
//! let accounts = VaultAccounts {
//!     custody: AccountId::new([0; 32]),
//!     operator: AccountId::new([1; 32]),
//!     treasury: AccountId::new([2; 32]),
//! };
//! let vault = SharedVault::new(
//!     LedgerConfig::from_env(),
//!     accounts,
//!     Arc::new(native),
//!     Arc::new(funding),
//!     SystemTimeSource,
//! )?;
//! let period = vault.current_period();
//! # let _ = period;
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod asset;
pub mod config;
pub mod error;
mod shared;
pub mod util;
pub mod vault;

/// Asset amount in smallest units (stroops for the native asset).
pub type Amount = i128;
/// Seconds since the Unix epoch.
pub type Timestamp = u64;
/// A period is identified by the timestamp at which it opened.
pub type PeriodId = Timestamp;

pub use account::AccountId;
pub use asset::{AssetError, InMemoryToken, TokenLedger};
pub use config::{ConfigError, LedgerConfig, UNIT};
pub use error::{ErrorKind, LedgerError};
pub use shared::SharedVault;
pub use util::time_source::{SharedMockTimeSource, SystemTimeSource, TimeSource};
pub use vault::{ClaimQuote, DepositBook, LedgerState, PeriodTracker, Vault, VaultAccounts};
