//! ATM Simulator Library
//!
//! Re-exports modules for the server binary and integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod jobs;
pub mod ledger;
pub mod session;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorResponse, Rejection};
pub use domain::{Amount, Balance, DomainError, OperationContext, Pin};
pub use ledger::{Customer, Ledger, Receipt};
pub use session::{AuthManager, SessionId, SessionStore};
