//! Command Handlers module
//!
//! Orchestrate ATM operations: session check, then ledger update.

mod commands;
mod teller_handler;


pub use commands::*;
pub use teller_handler::TellerHandler;
