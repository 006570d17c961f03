//! Domain module
//!
//! Core domain types and validation rules.

pub mod amount;
pub mod context;
pub mod error;
pub mod pin;
pub mod withdrawal;

pub use amount::{Amount, Balance, DEPOSIT_DENOMINATIONS};
pub use context::OperationContext;
pub use error::{DomainError, MAX_PIN_ATTEMPTS};
pub use pin::{Pin, PinHash};
pub use withdrawal::{MenuEntry, WithdrawalOption};
