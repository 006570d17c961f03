//! Account Ledger
//!
//! Owns customer records: names, PINs and balances.

mod customer;
mod service;

pub use customer::{Customer, Receipt, RECEIPT_TIME_FORMAT};
pub use service::Ledger;
