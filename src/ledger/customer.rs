//! Customer records
//!
//! Row types owned by the ledger.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::domain::{Balance, DomainError, PinHash};

/// Receipt timestamp layout, day first.
pub const RECEIPT_TIME_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// A row of the `customers` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pin_hash: String,
    pub balance: i64,
}

impl Customer {
    /// Check a PIN typed at login against the stored hash
    pub fn pin_matches(&self, candidate: &str) -> bool {
        PinHash::from_stored(self.pin_hash.clone()).verify(candidate)
    }

    pub fn balance(&self) -> Result<Balance, DomainError> {
        Balance::new(self.balance)
    }
}

/// Read-only snapshot printed at the end of a visit
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub name: String,
    pub balance: Balance,
    /// Local wall-clock time as printed on the slip
    pub timestamp: String,
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new(name: String, balance: Balance, issued_at: DateTime<Utc>) -> Self {
        let timestamp = issued_at
            .with_timezone(&Local)
            .format(RECEIPT_TIME_FORMAT)
            .to_string();

        Self {
            name,
            balance,
            timestamp,
            issued_at,
        }
    }
}
