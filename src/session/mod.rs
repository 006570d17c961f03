//! Session module
//!
//! Per-client session state and PIN authentication.

mod auth;
mod store;


pub use auth::AuthManager;
pub use store::{Identity, SessionData, SessionId, SessionStore};
