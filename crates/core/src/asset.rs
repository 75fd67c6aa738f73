//! Asset ledger collaborators.
//!
//! The vault never owns token balances itself. It holds a handle to each asset
//! ledger (native and funding) and moves value through the SEP-41 style
//! `transfer` / `transfer_from` primitives. Handles use interior mutability so
//! the same ledger can be shared between the vault and whoever mints or
//! approves on it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::account::AccountId;
use crate::Amount;

/// Errors from an asset ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("{account} holds {available}, needs {required}")]
    InsufficientBalance {
        account: AccountId,
        required: Amount,
        available: Amount,
    },
    #[error("{spender} may move {available} from {owner}, needs {required}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        required: Amount,
        available: Amount,
    },
    #[error("negative transfer amount {0}")]
    NegativeAmount(Amount),
    #[error("balance overflow for {0}")]
    Overflow(AccountId),
    #[error("{0}")]
    Rejected(String),
}

/// Abstraction over a fungible asset ledger.
///
/// Implementations must apply each call atomically: a failed transfer moves
/// nothing.
pub trait TokenLedger: Send + Sync + 'static {
    fn balance(&self, account: &AccountId) -> Amount;

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount;

    /// Move `amount` from `from` to `to`. The caller is trusted to act for `from`.
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError>;

    /// Move `amount` from `from` to `to` against the allowance `from` granted `spender`.
    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), AssetError>;
}

#[derive(Debug, Default)]
struct Book {
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
}

impl Book {
    fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn move_funds(&mut self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        if amount < 0 {
            return Err(AssetError::NegativeAmount(amount));
        }
        let available = self.balance(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                account: *from,
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(AssetError::Overflow(*to))?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

/// In-process asset ledger. Cloning yields another handle to the same book.
#[derive(Clone, Default)]
pub struct InMemoryToken {
    book: Arc<Mutex<Book>>,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `to` out of thin air.
    pub fn mint(&self, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        if amount < 0 {
            return Err(AssetError::NegativeAmount(amount));
        }
        let mut book = self.book.lock();
        let credited = book
            .balance(to)
            .checked_add(amount)
            .ok_or(AssetError::Overflow(*to))?;
        book.balances.insert(*to, credited);
        Ok(())
    }

    /// Set (not add to) the amount `spender` may move out of `owner`.
    pub fn approve(&self, owner: &AccountId, spender: &AccountId, amount: Amount) -> Result<(), AssetError> {
        if amount < 0 {
            return Err(AssetError::NegativeAmount(amount));
        }
        self.book
            .lock()
            .allowances
            .insert((*owner, *spender), amount);
        Ok(())
    }
}

impl TokenLedger for InMemoryToken {
    fn balance(&self, account: &AccountId) -> Amount {
        self.book.lock().balance(account)
    }

    fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.book
            .lock()
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        self.book.lock().move_funds(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), AssetError> {
        let mut book = self.book.lock();
        let key = (*from, *spender);
        let available = book.allowances.get(&key).copied().unwrap_or(0);
        if available < amount {
            return Err(AssetError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                required: amount,
                available,
            });
        }
        book.move_funds(from, to, amount)?;
        book.allowances.insert(key, available - amount);
        Ok(())
    }
}
