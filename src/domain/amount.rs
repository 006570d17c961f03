//! Amount type
//!
//! Domain primitives for cash amounts and account balances.
//! Amounts are whole NIS; the ATM never deals in fractions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Banknote multiples accepted by the deposit slot.
pub const DEPOSIT_DENOMINATIONS: [i64; 3] = [20, 50, 100];

/// Amount represents a validated cash amount.
///
/// # Invariants
/// - Value is always positive (> 0)
///
/// # Example
/// ```
/// use atm_simulator::domain::Amount;
///
/// let amount: Amount = "100".parse().unwrap();
/// assert_eq!(amount.value(), 100);
/// assert!("-5".parse::<Amount>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `DomainError::InvalidAmount` if value <= 0
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidAmount(format!(
                "amount must be positive (got {})",
                value
            )));
        }

        Ok(Self(value))
    }

    /// Get the underlying value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Check the amount can be made of the banknotes the deposit slot takes.
    pub fn ensure_deposit_denomination(&self) -> Result<(), DomainError> {
        if DEPOSIT_DENOMINATIONS.iter().any(|note| self.0 % note == 0) {
            Ok(())
        } else {
            Err(DomainError::InvalidDenomination(self.0))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} NIS", self.0)
    }
}

/// Parses raw form input. Anything that is not an integer is an invalid
/// amount, same as a non-positive one.
impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| DomainError::InvalidAmount(format!("not a whole number: {:?}", trimmed)))?;
        Amount::new(value)
    }
}

/// Balance represents an account balance (zero or positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(i64);

impl Balance {
    /// Create a balance, rejecting negative values
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::InvalidAmount(format!(
                "balance cannot be negative (got {})",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Add amount to balance
    pub fn credit(&self, amount: &Amount) -> Result<Balance, DomainError> {
        self.0
            .checked_add(amount.value())
            .map(Balance)
            .ok_or_else(|| DomainError::InvalidAmount("balance would overflow".to_string()))
    }

    /// Subtract amount from balance
    pub fn debit(&self, amount: &Amount) -> Result<Balance, DomainError> {
        if !self.is_sufficient_for(amount) {
            return Err(DomainError::insufficient_funds(amount.value(), self.0));
        }
        Ok(Balance(self.0 - amount.value()))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} NIS", self.0)
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}
