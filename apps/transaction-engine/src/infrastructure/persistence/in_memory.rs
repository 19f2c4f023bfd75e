//! In-memory repositories for testing and the demo runtime.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::portfolio::{Portfolio, PortfolioError, PortfolioRepository};
use crate::domain::shared::{PortfolioId, TransactionId};
use crate::domain::transaction::{Transaction, TransactionError, TransactionRepository};

/// In-memory implementation of `TransactionRepository`.
///
/// Suitable for testing and development. Not for production use.
#[derive(Debug, Default)]
pub struct InMemoryTransactionRepository {
    transactions: RwLock<HashMap<String, Transaction>>,
}

impl InMemoryTransactionRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transactions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of transactions in the repository.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.read().unwrap().len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.read().unwrap().is_empty()
    }

    /// Clear all transactions from the repository.
    pub fn clear(&self) {
        let mut transactions = self.transactions.write().unwrap();
        transactions.clear();
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn save(&self, transaction: &Transaction) -> Result<(), TransactionError> {
        let mut transactions = self.transactions.write().unwrap();
        transactions.insert(transaction.id().to_string(), transaction.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, TransactionError> {
        let transactions = self.transactions.read().unwrap();
        Ok(transactions.get(id.as_str()).cloned())
    }

    async fn find_by_portfolio(
        &self,
        portfolio_id: &PortfolioId,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let transactions = self.transactions.read().unwrap();
        Ok(transactions
            .values()
            .filter(|t| t.portfolio_id() == portfolio_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Transaction>, TransactionError> {
        let transactions = self.transactions.read().unwrap();
        Ok(transactions.values().cloned().collect())
    }
}

/// In-memory implementation of `PortfolioRepository`.
#[derive(Debug, Default)]
pub struct InMemoryPortfolioRepository {
    portfolios: RwLock<HashMap<String, Portfolio>>,
}

impl InMemoryPortfolioRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            portfolios: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of portfolios in the repository.
    #[must_use]
    pub fn len(&self) -> usize {
        self.portfolios.read().unwrap().len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.portfolios.read().unwrap().is_empty()
    }
}

#[async_trait]
impl PortfolioRepository for InMemoryPortfolioRepository {
    async fn save(&self, portfolio: &Portfolio) -> Result<(), PortfolioError> {
        let mut portfolios = self.portfolios.write().unwrap();
        portfolios.insert(portfolio.id().to_string(), portfolio.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PortfolioId) -> Result<Option<Portfolio>, PortfolioError> {
        let portfolios = self.portfolios.read().unwrap();
        Ok(portfolios.get(id.as_str()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Portfolio>, PortfolioError> {
        let portfolios = self.portfolios.read().unwrap();
        Ok(portfolios.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{AccountNumber, ClientId, Money, Quantity, Symbol};
    use crate::domain::transaction::{CreateTransactionCommand, TransactionType};
    use rust_decimal_macros::dec;

    fn create_test_transaction(portfolio: &str) -> Transaction {
        let command = CreateTransactionCommand {
            portfolio_id: PortfolioId::new(portfolio),
            account_number: AccountNumber::new("ACC-001"),
            transaction_type: TransactionType::Buy,
            symbol: Symbol::new("AAPL"),
            quantity: Quantity::from_i64(100),
            price: Money::new(dec!(150)),
            commission: None,
            currency: "USD".to_string(),
            notes: None,
        };
        Transaction::new(command).unwrap()
    }

    #[tokio::test]
    async fn save_and_find_by_id() {
        let repo = InMemoryTransactionRepository::new();
        let transaction = create_test_transaction("pf-1");
        let id = transaction.id().clone();

        repo.save(&transaction).await.unwrap();

        let found = repo.find_by_id(&id).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn find_by_id_not_found() {
        let repo = InMemoryTransactionRepository::new();
        let found = repo
            .find_by_id(&TransactionId::new("nonexistent"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_by_portfolio_filters() {
        let repo = InMemoryTransactionRepository::new();
        repo.save(&create_test_transaction("pf-1")).await.unwrap();
        repo.save(&create_test_transaction("pf-1")).await.unwrap();
        repo.save(&create_test_transaction("pf-2")).await.unwrap();

        let found = repo.find_by_portfolio(&PortfolioId::new("pf-1")).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn save_overwrites_existing() {
        let repo = InMemoryTransactionRepository::new();
        let mut transaction = create_test_transaction("pf-1");
        repo.save(&transaction).await.unwrap();

        transaction.begin_processing().unwrap();
        repo.save(&transaction).await.unwrap();

        assert_eq!(repo.len(), 1);
        let found = repo.find_by_id(transaction.id()).await.unwrap().unwrap();
        assert_eq!(found.status(), transaction.status());
    }

    #[tokio::test]
    async fn portfolio_round_trip() {
        let repo = InMemoryPortfolioRepository::new();
        let portfolio = Portfolio::new(
            ClientId::new("client-1"),
            AccountNumber::new("ACC-001"),
            "USD",
            Money::new(dec!(1000)),
        );
        repo.save(&portfolio).await.unwrap();

        let found = repo.find_by_id(portfolio.id()).await.unwrap().unwrap();
        assert_eq!(found.cash_balance(), portfolio.cash_balance());
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }
}
