//! Session/Auth Manager
//!
//! Login, logout and the session guard used by every transaction.

use crate::domain::{DomainError, MAX_PIN_ATTEMPTS};
use crate::error::{AppError, AppResult};
use crate::ledger::{Customer, Ledger};

use super::{Identity, SessionId, SessionStore};

/// Outcome of a PIN check against the session's attempt counter
enum PinCheck {
    Accepted,
    Rejected { attempts: u8 },
    LockedOut,
}

/// Authenticates customers and guards session-bound operations
#[derive(Debug, Clone)]
pub struct AuthManager {
    ledger: Ledger,
    sessions: SessionStore,
}

impl AuthManager {
    pub fn new(ledger: Ledger, sessions: SessionStore) -> Self {
        Self { ledger, sessions }
    }

    /// Log a session in with a name and PIN.
    ///
    /// Failed attempts are counted on the session, not on the customer.
    /// The third consecutive failure resets the counter and fails with
    /// `TooManyAttempts`.
    pub async fn authenticate(&self, session: SessionId, name: &str, pin: &str) -> AppResult<Identity> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::NotFound("name is required".to_string()).into());
        }

        let customer = self.ledger.find_by_name(name).await?;
        let matches = customer.pin_matches(pin);

        let outcome = self
            .sessions
            .update(session, |data| {
                if matches {
                    *data = Default::default();
                    data.identity = Some(Identity {
                        customer_id: customer.id,
                        customer_name: customer.name.clone(),
                    });
                    data.cached_balance = Some(customer.balance);
                    return PinCheck::Accepted;
                }

                data.pin_attempts += 1;
                if data.pin_attempts >= MAX_PIN_ATTEMPTS {
                    data.pin_attempts = 0;
                    PinCheck::LockedOut
                } else {
                    PinCheck::Rejected {
                        attempts: data.pin_attempts,
                    }
                }
            })
            .await;

        match outcome {
            PinCheck::Accepted => {
                tracing::info!(session_id = %session, customer_id = customer.id, "Login succeeded");
                Ok(Identity {
                    customer_id: customer.id,
                    customer_name: customer.name,
                })
            }
            PinCheck::Rejected { attempts } => {
                tracing::warn!(session_id = %session, attempts = attempts, "Incorrect PIN");
                Err(DomainError::invalid_pin(attempts).into())
            }
            PinCheck::LockedOut => {
                tracing::warn!(session_id = %session, "Too many incorrect PIN attempts");
                Err(DomainError::TooManyAttempts.into())
            }
        }
    }

    /// Identity of a logged-in session, or `Unauthenticated`.
    /// A successful check counts as session activity.
    pub async fn require_session(&self, session: SessionId) -> AppResult<Identity> {
        self.sessions
            .touch(session)
            .await
            .identity
            .ok_or_else(|| DomainError::Unauthenticated.into())
    }

    /// Destroy the session unconditionally
    pub async fn logout(&self, session: SessionId) {
        self.sessions.destroy(session).await;
        tracing::info!(session_id = %session, "Logged out");
    }

    /// Reload the session's customer. A customer that no longer exists
    /// ends the session.
    pub async fn active_customer(&self, session: SessionId) -> AppResult<Customer> {
        let identity = self.require_session(session).await?;

        match self.ledger.find_by_id(identity.customer_id).await {
            Ok(customer) => Ok(customer),
            Err(AppError::Domain(DomainError::NotFound(_))) => {
                tracing::warn!(
                    session_id = %session,
                    customer_id = identity.customer_id,
                    "Session customer vanished, forcing logout"
                );
                self.logout(session).await;
                Err(DomainError::NotFound(identity.customer_name).into())
            }
            Err(e) => Err(e),
        }
    }

    /// Remember the balance last shown to this session
    pub async fn cache_balance(&self, session: SessionId, balance: i64) {
        self.sessions
            .update(session, |data| {
                if data.is_authenticated() {
                    data.cached_balance = Some(balance);
                }
            })
            .await;
    }
}
