//! Ledger Service
//!
//! Reads and writes customer rows. Every call borrows a pooled connection
//! for the duration of one statement.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::{Amount, Balance, DomainError, Pin, PinHash};
use crate::error::{AppError, AppResult};

use super::{Customer, Receipt};

/// Account Ledger over the `customers` table
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

impl Ledger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Find a customer by name, ignoring case
    pub async fn find_by_name(&self, name: &str) -> AppResult<Customer> {
        let customer: Option<Customer> = sqlx::query_as(
            r#"
            SELECT id, name, pin_hash, balance
            FROM customers
            WHERE LOWER(name) = LOWER(?)
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        customer.ok_or_else(|| DomainError::NotFound(name.to_string()).into())
    }

    pub async fn find_by_id(&self, customer_id: i64) -> AppResult<Customer> {
        let customer: Option<Customer> = sqlx::query_as(
            "SELECT id, name, pin_hash, balance FROM customers WHERE id = ?",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        customer.ok_or_else(|| missing(customer_id))
    }

    pub async fn get_balance(&self, customer_id: i64) -> AppResult<Balance> {
        let balance: Option<i64> = sqlx::query_scalar("SELECT balance FROM customers WHERE id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;

        let balance = balance.ok_or_else(|| missing(customer_id))?;
        Ok(Balance::new(balance)?)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Credit a deposit and return the new balance
    pub async fn deposit(&self, customer_id: i64, amount: &Amount) -> AppResult<Balance> {
        amount.ensure_deposit_denomination()?;

        // Guard against i64 overflow in the same statement as the update.
        let headroom = i64::MAX - amount.value();
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE customers
            SET balance = balance + ?
            WHERE id = ? AND balance <= ?
            RETURNING balance
            "#,
        )
        .bind(amount.value())
        .bind(customer_id)
        .bind(headroom)
        .fetch_optional(&self.pool)
        .await?;

        let new_balance = match updated {
            Some(balance) => Balance::new(balance)?,
            None => {
                // Either the row is gone or the credit would overflow.
                let current = self.get_balance(customer_id).await?;
                current.credit(amount)?;
                return Err(AppError::Internal(format!(
                    "deposit for customer #{} was not applied",
                    customer_id
                )));
            }
        };

        tracing::debug!(
            customer_id = customer_id,
            amount = amount.value(),
            balance = new_balance.value(),
            "Deposit credited"
        );

        Ok(new_balance)
    }

    /// Debit a withdrawal and return the new balance.
    ///
    /// The funds check is part of the UPDATE, so a balance never goes
    /// negative even with concurrent withdrawals.
    pub async fn withdraw(&self, customer_id: i64, amount: &Amount) -> AppResult<Balance> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE customers
            SET balance = balance - ?
            WHERE id = ? AND balance >= ?
            RETURNING balance
            "#,
        )
        .bind(amount.value())
        .bind(customer_id)
        .bind(amount.value())
        .fetch_optional(&self.pool)
        .await?;

        let new_balance = match updated {
            Some(balance) => Balance::new(balance)?,
            None => {
                let available = self.get_balance(customer_id).await?;
                tracing::info!(
                    customer_id = customer_id,
                    requested = amount.value(),
                    available = available.value(),
                    "Withdrawal refused"
                );
                return Err(DomainError::insufficient_funds(amount.value(), available.value()).into());
            }
        };

        tracing::debug!(
            customer_id = customer_id,
            amount = amount.value(),
            balance = new_balance.value(),
            "Withdrawal debited"
        );

        Ok(new_balance)
    }

    /// Replace the stored PIN
    pub async fn change_pin(&self, customer_id: i64, new_pin: &Pin) -> AppResult<()> {
        let hash = hash_pin(new_pin)?;

        let result = sqlx::query("UPDATE customers SET pin_hash = ? WHERE id = ?")
            .bind(hash.as_str())
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(missing(customer_id));
        }

        tracing::info!(customer_id = customer_id, "PIN changed");
        Ok(())
    }

    pub async fn receipt(&self, customer_id: i64) -> AppResult<Receipt> {
        let customer = self.find_by_id(customer_id).await?;
        let balance = customer.balance()?;
        Ok(Receipt::new(customer.name, balance, Utc::now()))
    }

    // =========================================================================
    // Provisioning (not exposed over HTTP)
    // =========================================================================

    /// Insert a new customer
    pub async fn create_customer(
        &self,
        name: &str,
        pin: &Pin,
        opening_balance: Balance,
    ) -> AppResult<Customer> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Internal("customer name cannot be empty".to_string()));
        }

        let hash = hash_pin(pin)?;
        let customer_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO customers (name, pin_hash, balance)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(hash.as_str())
        .bind(opening_balance.value())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(customer_id = customer_id, name = %name, "Customer provisioned");

        self.find_by_id(customer_id).await
    }

    pub async fn count_customers(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn hash_pin(pin: &Pin) -> AppResult<PinHash> {
    PinHash::generate(pin).map_err(|e| AppError::Internal(format!("PIN hashing failed: {}", e)))
}

fn missing(customer_id: i64) -> AppError {
    DomainError::NotFound(format!("customer #{}", customer_id)).into()
}
