//! PIN types
//!
//! `Pin` is a validated 4-digit PIN as typed by the customer.
//! `PinHash` is what the ledger stores: an Argon2id hash.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use std::fmt;
use std::str::FromStr;

use super::DomainError;

const PIN_LENGTH: usize = 4;

/// A PIN of exactly four ASCII decimal digits.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub fn new(value: &str) -> Result<Self, DomainError> {
        if value.len() == PIN_LENGTH && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(DomainError::InvalidPinFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pin {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pin::new(s)
    }
}

// Keep PINs out of logs.
impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Argon2 hash of a PIN as a PHC string (algorithm, params and salt inline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinHash(String);

impl PinHash {
    /// Hash a PIN with a fresh random salt
    pub fn generate(pin: &Pin) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(pin.as_str().as_bytes(), &salt)?;
        Ok(Self(hash.to_string()))
    }

    /// Rebuild from the stored column
    pub fn from_stored(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a candidate PIN.
    ///
    /// The candidate is raw login input and is not format-checked: a
    /// malformed entry is just a wrong PIN. An unparseable stored hash
    /// matches nothing.
    pub fn verify(&self, candidate: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!(error = %e, "Stored PIN hash is unreadable");
                false
            }
        }
    }
}
