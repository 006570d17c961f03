//! Withdrawal menu
//!
//! The ATM offers four fixed amounts plus an "other amount" entry.

use serde::Serialize;

use super::{Amount, DomainError};

/// Fixed withdrawal amounts by option code.
pub const FIXED_WITHDRAWALS: [(&str, i64); 4] = [("1", 50), ("2", 100), ("3", 150), ("4", 300)];

/// Option code for a free-form amount.
pub const OTHER_AMOUNT_OPTION: &str = "5";

/// A parsed withdrawal menu choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalOption {
    Fixed(Amount),
    Other,
}

impl WithdrawalOption {
    /// Parse an option code. Unknown or missing codes are an invalid selection.
    pub fn parse(code: Option<&str>) -> Result<Self, DomainError> {
        let code = code.map(str::trim).unwrap_or_default();

        if code == OTHER_AMOUNT_OPTION {
            return Ok(Self::Other);
        }

        FIXED_WITHDRAWALS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, value)| Amount::new(*value).map(Self::Fixed))
            .unwrap_or_else(|| Err(DomainError::InvalidSelection(code.to_string())))
    }

    /// Resolve the amount to withdraw. A missing "other" amount counts as zero.
    pub fn resolve(self, other_amount: Option<&str>) -> Result<Amount, DomainError> {
        match self {
            Self::Fixed(amount) => Ok(amount),
            Self::Other => other_amount.unwrap_or("0").parse(),
        }
    }
}

/// One entry of the menu shown on the withdraw screen
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MenuEntry {
    pub option: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    pub label: String,
}

/// The full withdraw menu, fixed amounts first
pub fn menu() -> Vec<MenuEntry> {
    FIXED_WITHDRAWALS
        .iter()
        .map(|(option, amount)| MenuEntry {
            option: *option,
            amount: Some(*amount),
            label: format!("{} NIS", amount),
        })
        .chain(std::iter::once(MenuEntry {
            option: OTHER_AMOUNT_OPTION,
            amount: None,
            label: "Other amount".to_string(),
        }))
        .collect()
}
