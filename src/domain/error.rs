//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Failed PIN entries allowed per login sequence.
pub const MAX_PIN_ATTEMPTS: u8 = 3;

/// Domain-specific errors
///
/// Every variant is a recoverable, user-facing condition. The caller reports
/// the message and returns the user to a known form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No customer with that name, or the session's customer vanished
    #[error("User not found: {0}")]
    NotFound(String),

    /// Wrong PIN, more attempts left in this login sequence
    #[error("Incorrect PIN. Attempts: {attempts}/{}", MAX_PIN_ATTEMPTS)]
    InvalidPin { attempts: u8, remaining: u8 },

    /// Wrong PIN for the last allowed time; login must restart
    #[error("Too many incorrect PIN attempts. Try again later.")]
    TooManyAttempts,

    /// Operation needs a logged-in session
    #[error("Login required")]
    Unauthenticated,

    /// Zero, negative, or non-numeric amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Deposit not made of accepted banknotes
    #[error("Amount must be multiple of 20, 50 or 100 (got {0})")]
    InvalidDenomination(i64),

    /// Unknown withdrawal option code
    #[error("Invalid selection: {0:?}")]
    InvalidSelection(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    #[error("Invalid PIN format. Must be 4 digits.")]
    InvalidPinFormat,
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(requested: i64, available: i64) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }

    /// Create an invalid PIN error for the given number of failed attempts
    pub fn invalid_pin(attempts: u8) -> Self {
        Self::InvalidPin {
            attempts,
            remaining: MAX_PIN_ATTEMPTS.saturating_sub(attempts),
        }
    }

    /// Errors after which the user has to go back to the login form
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidPin { .. } | Self::TooManyAttempts | Self::Unauthenticated
        )
    }
}
