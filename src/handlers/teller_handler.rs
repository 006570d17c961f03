//! Teller Handler
//!
//! Session-bound ATM operations. Every call re-validates the session's
//! customer before touching the ledger.

use crate::domain::{Amount, Balance, OperationContext, Pin, WithdrawalOption};
use crate::error::AppResult;
use crate::ledger::{Ledger, Receipt};
use crate::session::{AuthManager, SessionId, SessionStore};

use super::{AccountView, ChangePinCommand, DepositCommand, TransactionResult, WithdrawCommand};

/// Handler for menu, balance, deposit, withdraw, PIN change and receipt
#[derive(Debug, Clone)]
pub struct TellerHandler {
    auth: AuthManager,
    ledger: Ledger,
}

impl TellerHandler {
    pub fn new(ledger: Ledger, sessions: SessionStore) -> Self {
        Self {
            auth: AuthManager::new(ledger.clone(), sessions),
            ledger,
        }
    }

    /// Name and fresh balance for the main menu
    pub async fn menu(&self, session: SessionId, context: &OperationContext) -> AppResult<AccountView> {
        let customer = self.auth.active_customer(session).await?;
        let balance = customer.balance()?;
        self.auth.cache_balance(session, balance.value()).await;

        tracing::debug!(
            correlation_id = ?context.correlation_id,
            customer_id = customer.id,
            "Menu viewed"
        );

        Ok(AccountView {
            customer_id: customer.id,
            name: customer.name,
            balance,
        })
    }

    pub async fn balance(&self, session: SessionId, context: &OperationContext) -> AppResult<Balance> {
        let customer = self.auth.active_customer(session).await?;
        let balance = self.ledger.get_balance(customer.id).await?;
        self.auth.cache_balance(session, balance.value()).await;

        tracing::debug!(
            correlation_id = ?context.correlation_id,
            customer_id = customer.id,
            "Balance viewed"
        );

        Ok(balance)
    }

    pub async fn deposit(
        &self,
        session: SessionId,
        command: DepositCommand,
        context: &OperationContext,
    ) -> AppResult<TransactionResult> {
        let customer = self.auth.active_customer(session).await?;
        let amount: Amount = command.amount.parse()?;

        let balance = self.ledger.deposit(customer.id, &amount).await?;
        self.auth.cache_balance(session, balance.value()).await;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            customer_id = customer.id,
            amount = amount.value(),
            "Deposit completed"
        );

        Ok(TransactionResult {
            customer_id: customer.id,
            amount: amount.value(),
            balance,
            message: format!("Deposited {}. New balance: {}.", amount, balance),
        })
    }

    pub async fn withdraw(
        &self,
        session: SessionId,
        command: WithdrawCommand,
        context: &OperationContext,
    ) -> AppResult<TransactionResult> {
        let customer = self.auth.active_customer(session).await?;
        let amount = WithdrawalOption::parse(command.option.as_deref())?
            .resolve(command.other_amount.as_deref())?;

        let balance = self.ledger.withdraw(customer.id, &amount).await?;
        self.auth.cache_balance(session, balance.value()).await;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            customer_id = customer.id,
            amount = amount.value(),
            "Withdrawal completed"
        );

        Ok(TransactionResult {
            customer_id: customer.id,
            amount: amount.value(),
            balance,
            message: format!("Withdrew {}. Remaining: {}.", amount, balance),
        })
    }

    pub async fn change_pin(
        &self,
        session: SessionId,
        command: ChangePinCommand,
        context: &OperationContext,
    ) -> AppResult<()> {
        let customer = self.auth.active_customer(session).await?;
        let pin = Pin::new(&command.new_pin)?;

        self.ledger.change_pin(customer.id, &pin).await?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            customer_id = customer.id,
            "PIN change completed"
        );

        Ok(())
    }

    pub async fn receipt(&self, session: SessionId, context: &OperationContext) -> AppResult<Receipt> {
        let customer = self.auth.active_customer(session).await?;
        let receipt = self.ledger.receipt(customer.id).await?;

        tracing::debug!(
            correlation_id = ?context.correlation_id,
            customer_id = customer.id,
            "Receipt issued"
        );

        Ok(receipt)
    }
}
