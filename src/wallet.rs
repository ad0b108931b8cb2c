use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("movie is already owned")]
    AlreadyOwned,
    #[error("balance of {balance} cannot cover a price of {price}")]
    InsufficientBalance { balance: i64, price: i64 },
}

/// Session-lifetime purchase wallet. Created once at startup and shared by
/// every handler; a successful purchase is the only mutator.
#[derive(Debug, Clone)]
pub struct Wallet {
    balance: i64,
    owned: HashSet<i64>,
}

impl Wallet {
    pub fn new(starting_balance: i64) -> Self {
        Self {
            balance: starting_balance,
            owned: HashSet::new(),
        }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn is_owned(&self, movie_id: i64) -> bool {
        self.owned.contains(&movie_id)
    }

    /// Attempts to buy a movie at the given price and returns the new
    /// balance. Owned titles are never charged twice, and the balance must
    /// stay strictly positive after the deduction.
    pub fn purchase(&mut self, movie_id: i64, price: i64) -> Result<i64, PurchaseError> {
        if self.owned.contains(&movie_id) {
            return Err(PurchaseError::AlreadyOwned);
        }
        if self.balance - price <= 0 {
            return Err(PurchaseError::InsufficientBalance {
                balance: self.balance,
                price,
            });
        }
        self.balance -= price;
        self.owned.insert(movie_id);
        Ok(self.balance)
    }
}
