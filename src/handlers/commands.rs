//! Command definitions
//!
//! Commands carry raw form input into the teller; validation happens there.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Balance;

/// Command to deposit cash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositCommand {
    /// Amount as typed
    pub amount: String,
}

impl DepositCommand {
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
        }
    }
}

/// Command to withdraw cash through the option menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawCommand {
    /// Menu option code ("1".."5")
    pub option: Option<String>,
    /// Amount for option "5"
    pub other_amount: Option<String>,
}

impl WithdrawCommand {
    pub fn option(code: impl Into<String>) -> Self {
        Self {
            option: Some(code.into()),
            other_amount: None,
        }
    }

    pub fn other_amount(amount: impl Into<String>) -> Self {
        Self {
            option: Some(crate::domain::withdrawal::OTHER_AMOUNT_OPTION.to_string()),
            other_amount: Some(amount.into()),
        }
    }
}

/// Command to replace the customer's PIN
#[derive(Clone, Deserialize)]
pub struct ChangePinCommand {
    pub new_pin: String,
}

impl ChangePinCommand {
    pub fn new(new_pin: impl Into<String>) -> Self {
        Self {
            new_pin: new_pin.into(),
        }
    }
}

impl fmt::Debug for ChangePinCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePinCommand")
            .field("new_pin", &"****")
            .finish()
    }
}

/// Name and balance shown on the main menu
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub customer_id: i64,
    pub name: String,
    pub balance: Balance,
}

/// Result of a deposit or withdrawal
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResult {
    pub customer_id: i64,
    pub amount: i64,
    pub balance: Balance,
    pub message: String,
}
