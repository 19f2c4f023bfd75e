//! Transaction Aggregate Root
//!
//! The Transaction aggregate owns the lifecycle of a single transaction.
//! It is the only component allowed to mutate transaction status, and it
//! records one domain event per transition. Transactions form an
//! append-only audit trail and are never physically deleted.

use serde::{Deserialize, Serialize};

use crate::domain::shared::{
    AccountNumber, Money, PortfolioId, Quantity, Symbol, Timestamp, TransactionId,
};
use crate::domain::transaction::errors::TransactionError;
use crate::domain::transaction::events::{TransactionEvent, TransitionSnapshot};
use crate::domain::transaction::state_machine::TransactionStateMachine;
use crate::domain::transaction::value_objects::{TransactionStatus, TransactionType};

/// Command to create a new transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionCommand {
    /// Portfolio the transaction belongs to.
    pub portfolio_id: PortfolioId,
    /// Account reference.
    pub account_number: AccountNumber,
    /// Transaction kind.
    pub transaction_type: TransactionType,
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Quantity (must be positive).
    pub quantity: Quantity,
    /// Unit price (must be positive).
    pub price: Money,
    /// Commission (non-negative, defaults to zero).
    pub commission: Option<Money>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Free-text note.
    pub notes: Option<String>,
}

impl CreateTransactionCommand {
    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if required parameters are missing or invalid.
    pub fn validate(&self) -> Result<(), TransactionError> {
        self.symbol
            .validate()
            .map_err(|e| TransactionError::Validation {
                field: "symbol".to_string(),
                message: e.to_string(),
            })?;

        self.quantity
            .validate_for_transaction()
            .map_err(|e| TransactionError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;

        self.price
            .validate_as_price()
            .map_err(|e| TransactionError::Validation {
                field: "price".to_string(),
                message: e.to_string(),
            })?;

        if let Some(commission) = &self.commission {
            commission
                .validate_as_commission()
                .map_err(|e| TransactionError::Validation {
                    field: "commission".to_string(),
                    message: e.to_string(),
                })?;
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TransactionError::Validation {
                field: "currency".to_string(),
                message: format!("Expected ISO 4217 code, got '{}'", self.currency),
            });
        }

        Ok(())
    }
}

/// Transaction Aggregate Root.
///
/// Invariant: `total_amount` always equals `amount + commission` where
/// `amount = quantity * price`. The amounts are recomputed whenever
/// quantity, price, or commission change prior to a terminal state; once
/// terminal, the record is immutable except for transitions explicitly
/// permitted by the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    portfolio_id: PortfolioId,
    account_number: AccountNumber,
    transaction_type: TransactionType,
    symbol: Symbol,
    quantity: Quantity,
    price: Money,
    commission: Money,
    amount: Money,
    total_amount: Money,
    currency: String,
    status: TransactionStatus,
    notes: Option<String>,
    #[serde(skip)]
    events: Vec<TransactionEvent>,
    created_at: Timestamp,
    processed_at: Option<Timestamp>,
}

impl Transaction {
    /// Create a new transaction from a command.
    ///
    /// Validates the command, computes gross and total amounts, and records
    /// a `Created` event. The transaction starts in PENDING.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Validation` before any state change if the
    /// command is invalid.
    pub fn new(cmd: CreateTransactionCommand) -> Result<Self, TransactionError> {
        cmd.validate()?;

        let commission = cmd.commission.unwrap_or(Money::ZERO);
        let amount = cmd.price * cmd.quantity.amount();
        let total_amount = amount + commission;

        let mut transaction = Self {
            id: TransactionId::generate(),
            portfolio_id: cmd.portfolio_id,
            account_number: cmd.account_number,
            transaction_type: cmd.transaction_type,
            symbol: cmd.symbol,
            quantity: cmd.quantity,
            price: cmd.price,
            commission,
            amount,
            total_amount,
            currency: cmd.currency,
            status: TransactionStatus::Pending,
            notes: cmd.notes,
            events: Vec::new(),
            created_at: Timestamp::now(),
            processed_at: None,
        };

        transaction
            .events
            .push(TransactionEvent::Created(transaction.snapshot()));

        Ok(transaction)
    }

    /// Transaction ID.
    #[must_use]
    pub const fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Referenced portfolio.
    #[must_use]
    pub const fn portfolio_id(&self) -> &PortfolioId {
        &self.portfolio_id
    }

    /// Referenced account.
    #[must_use]
    pub const fn account_number(&self) -> &AccountNumber {
        &self.account_number
    }

    /// Transaction kind.
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    /// Instrument symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Unit price.
    #[must_use]
    pub const fn price(&self) -> Money {
        self.price
    }

    /// Commission.
    #[must_use]
    pub const fn commission(&self) -> Money {
        self.commission
    }

    /// Gross amount (quantity * price).
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Total amount (gross + commission).
    #[must_use]
    pub const fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Free-text note.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Processing completion timestamp. Set only on terminal success.
    #[must_use]
    pub const fn processed_at(&self) -> Option<Timestamp> {
        self.processed_at
    }

    /// Whether the transaction is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Update the quantity and recompute the amounts.
    ///
    /// # Errors
    ///
    /// Returns error if the transaction is terminal or the quantity invalid.
    pub fn update_quantity(&mut self, quantity: Quantity) -> Result<(), TransactionError> {
        self.ensure_mutable("quantity")?;
        quantity
            .validate_for_transaction()
            .map_err(|e| TransactionError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;
        self.quantity = quantity;
        self.recompute_amounts();
        Ok(())
    }

    /// Update the unit price and recompute the amounts.
    ///
    /// # Errors
    ///
    /// Returns error if the transaction is terminal or the price invalid.
    pub fn update_price(&mut self, price: Money) -> Result<(), TransactionError> {
        self.ensure_mutable("price")?;
        price
            .validate_as_price()
            .map_err(|e| TransactionError::Validation {
                field: "price".to_string(),
                message: e.to_string(),
            })?;
        self.price = price;
        self.recompute_amounts();
        Ok(())
    }

    /// Update the commission and recompute the amounts.
    ///
    /// # Errors
    ///
    /// Returns error if the transaction is terminal or the commission invalid.
    pub fn update_commission(&mut self, commission: Money) -> Result<(), TransactionError> {
        self.ensure_mutable("commission")?;
        commission
            .validate_as_commission()
            .map_err(|e| TransactionError::Validation {
                field: "commission".to_string(),
                message: e.to_string(),
            })?;
        self.commission = commission;
        self.recompute_amounts();
        Ok(())
    }

    /// Begin processing: PENDING -> PROCESSING.
    ///
    /// Records a `Processing` event.
    ///
    /// # Errors
    ///
    /// Returns error if the transaction is not in PENDING.
    pub fn begin_processing(&mut self) -> Result<(), TransactionError> {
        self.transition(TransactionStatus::Processing)?;
        self.events
            .push(TransactionEvent::Processing(self.snapshot()));
        Ok(())
    }

    /// Complete settlement: PROCESSING -> COMPLETED.
    ///
    /// Sets the processed timestamp and records a `Completed` event.
    ///
    /// # Errors
    ///
    /// Returns error if the transaction is not in PROCESSING.
    pub fn complete(&mut self) -> Result<(), TransactionError> {
        self.transition(TransactionStatus::Completed)?;
        self.processed_at = Some(Timestamp::now());
        self.events
            .push(TransactionEvent::Completed(self.snapshot()));
        Ok(())
    }

    /// Record settlement failure: PROCESSING -> FAILED.
    ///
    /// The failure reason is appended to the notes so the audit trail keeps
    /// it. Records a `Failed` event.
    ///
    /// # Errors
    ///
    /// Returns error if the transaction is not in PROCESSING.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), TransactionError> {
        self.transition(TransactionStatus::Failed)?;
        let reason = reason.into();
        self.notes = Some(match self.notes.take() {
            Some(notes) => format!("{notes}; {reason}"),
            None => reason,
        });
        self.events.push(TransactionEvent::Failed(self.snapshot()));
        Ok(())
    }

    /// Cancel the transaction: PENDING | PROCESSING -> CANCELLED.
    ///
    /// Records a `Cancelled` event.
    ///
    /// # Errors
    ///
    /// Returns `CannotCancel` if the transaction is already terminal.
    pub fn cancel(&mut self) -> Result<(), TransactionError> {
        if self.status.is_terminal() {
            return Err(TransactionError::CannotCancel {
                status: self.status,
            });
        }
        self.transition(TransactionStatus::Cancelled)?;
        self.events
            .push(TransactionEvent::Cancelled(self.snapshot()));
        Ok(())
    }

    /// Drain accumulated domain events for publishing.
    pub fn drain_events(&mut self) -> Vec<TransactionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot of the fields a consumer needs to act without re-querying.
    #[must_use]
    pub fn snapshot(&self) -> TransitionSnapshot {
        TransitionSnapshot {
            transaction_id: self.id.clone(),
            portfolio_id: self.portfolio_id.clone(),
            account_number: self.account_number.clone(),
            transaction_type: self.transaction_type,
            symbol: self.symbol.clone(),
            quantity: self.quantity,
            price: self.price,
            total_amount: self.total_amount,
            status: self.status,
            occurred_at: Timestamp::now(),
        }
    }

    fn transition(&mut self, to: TransactionStatus) -> Result<(), TransactionError> {
        TransactionStateMachine::validate_transition(self.status, to)?;
        self.status = to;
        Ok(())
    }

    fn ensure_mutable(&self, field: &str) -> Result<(), TransactionError> {
        if self.status.is_terminal() {
            return Err(TransactionError::Validation {
                field: field.to_string(),
                message: format!("Transaction is {} and immutable", self.status),
            });
        }
        Ok(())
    }

    fn recompute_amounts(&mut self) {
        self.amount = self.price * self.quantity.amount();
        self.total_amount = self.amount + self.commission;
    }
}
