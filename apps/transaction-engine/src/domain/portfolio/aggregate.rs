//! Portfolio Aggregate Root
//!
//! Holds cash and an insertion-ordered list of holdings.
//!
//! Invariant: `total_value == cash_balance + sum(holding market values)`
//! after every mutation. Each mutator recomputes derived holding fields
//! first, then the total, synchronously before returning.

use serde::{Deserialize, Serialize};

use super::errors::PortfolioError;
use super::holding::Holding;
use crate::domain::shared::{AccountNumber, ClientId, Money, PortfolioId, Quantity, Symbol, Timestamp};

/// Portfolio status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioStatus {
    /// Open for transactions.
    Active,
    /// Closed; no further mutations expected.
    Closed,
}

/// Portfolio Aggregate Root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    id: PortfolioId,
    client_id: ClientId,
    account_number: AccountNumber,
    currency: String,
    cash_balance: Money,
    total_value: Money,
    status: PortfolioStatus,
    holdings: Vec<Holding>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Portfolio {
    /// Create a new active portfolio with an opening cash balance.
    #[must_use]
    pub fn new(
        client_id: ClientId,
        account_number: AccountNumber,
        currency: impl Into<String>,
        opening_cash: Money,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PortfolioId::generate(),
            client_id,
            account_number,
            currency: currency.into(),
            cash_balance: opening_cash,
            total_value: opening_cash,
            status: PortfolioStatus::Active,
            holdings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Portfolio ID.
    #[must_use]
    pub const fn id(&self) -> &PortfolioId {
        &self.id
    }

    /// Owning client.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Account reference.
    #[must_use]
    pub const fn account_number(&self) -> &AccountNumber {
        &self.account_number
    }

    /// Currency code.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Cash balance.
    #[must_use]
    pub const fn cash_balance(&self) -> Money {
        self.cash_balance
    }

    /// Total value (cash + holdings market value).
    #[must_use]
    pub const fn total_value(&self) -> Money {
        self.total_value
    }

    /// Portfolio status.
    #[must_use]
    pub const fn status(&self) -> PortfolioStatus {
        self.status
    }

    /// Holdings, in insertion order.
    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Look up a holding by symbol.
    #[must_use]
    pub fn holding(&self, symbol: &Symbol) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol() == symbol)
    }

    /// Last mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Apply a completed BUY: debit cash by the total cost (gross +
    /// commission) and add the lot to the holding, creating it if absent.
    pub fn apply_buy(
        &mut self,
        symbol: &Symbol,
        quantity: Quantity,
        price: Money,
        total_cost: Money,
    ) {
        self.cash_balance = self.cash_balance - total_cost;
        if let Some(holding) = self.holdings.iter_mut().find(|h| h.symbol() == symbol) {
            holding.add_lot(quantity, price);
        } else {
            self.holdings
                .push(Holding::open(symbol.clone(), quantity, price));
        }
        self.recompute_total_value();
    }

    /// Apply a completed SELL: credit cash with the net proceeds (gross -
    /// commission) and reduce the holding, removing it at zero quantity.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientHolding` without mutating anything if the
    /// requested quantity exceeds the held quantity or the holding is absent.
    pub fn apply_sell(
        &mut self,
        symbol: &Symbol,
        quantity: Quantity,
        price: Money,
        proceeds: Money,
    ) -> Result<(), PortfolioError> {
        let available = self.holding(symbol).map_or(Quantity::ZERO, Holding::quantity);
        if quantity > available {
            return Err(PortfolioError::InsufficientHolding {
                symbol: symbol.to_string(),
                requested: quantity.to_string(),
                available: available.to_string(),
            });
        }

        self.cash_balance = self.cash_balance + proceeds;
        if let Some(holding) = self.holdings.iter_mut().find(|h| h.symbol() == symbol) {
            holding.remove_quantity(quantity, price);
        }
        self.holdings.retain(|h| !h.quantity().is_zero());
        self.recompute_total_value();
        Ok(())
    }

    /// Credit cash (DEPOSIT, DIVIDEND).
    pub fn credit_cash(&mut self, amount: Money) {
        self.cash_balance = self.cash_balance + amount;
        self.recompute_total_value();
    }

    /// Debit cash (WITHDRAWAL).
    ///
    /// The projection applies completed facts and does not re-validate
    /// purchasing power, so the balance may go negative here rather than
    /// diverge from the source of truth.
    pub fn debit_cash(&mut self, amount: Money) {
        self.cash_balance = self.cash_balance - amount;
        self.recompute_total_value();
    }

    fn recompute_total_value(&mut self) {
        let holdings_value = self
            .holdings
            .iter()
            .fold(Money::ZERO, |acc, h| acc + h.market_value());
        self.total_value = self.cash_balance + holdings_value;
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn portfolio() -> Portfolio {
        Portfolio::new(
            ClientId::new("client-1"),
            AccountNumber::new("ACC-001"),
            "USD",
            Money::new(dec!(100000)),
        )
    }

    fn total_of(p: &Portfolio) -> Money {
        p.holdings()
            .iter()
            .fold(p.cash_balance(), |acc, h| acc + h.market_value())
    }

    #[test]
    fn new_portfolio_total_equals_cash() {
        let p = portfolio();
        assert_eq!(p.total_value().amount(), dec!(100000));
        assert!(p.holdings().is_empty());
    }

    #[test]
    fn buy_creates_holding_and_restores_invariant() {
        let mut p = portfolio();
        p.apply_buy(
            &Symbol::new("AAPL"),
            Quantity::from_i64(100),
            Money::new(dec!(150)),
            Money::new(dec!(15009.99)),
        );
        assert_eq!(p.cash_balance().amount(), dec!(84990.01));
        let holding = p.holding(&Symbol::new("AAPL")).unwrap();
        assert_eq!(holding.quantity().amount(), dec!(100));
        assert_eq!(holding.average_cost().amount(), dec!(150));
        assert_eq!(p.total_value(), total_of(&p));
    }

    #[test]
    fn second_buy_recomputes_weighted_average() {
        let mut p = portfolio();
        let aapl = Symbol::new("AAPL");
        p.apply_buy(&aapl, Quantity::from_i64(100), Money::new(dec!(100)), Money::new(dec!(10000)));
        p.apply_buy(&aapl, Quantity::from_i64(50), Money::new(dec!(130)), Money::new(dec!(6500)));
        let holding = p.holding(&aapl).unwrap();
        assert_eq!(holding.quantity().amount(), dec!(150));
        assert_eq!(holding.average_cost().amount(), dec!(110));
        assert_eq!(p.total_value(), total_of(&p));
    }

    #[test]
    fn sell_reduces_and_removes_at_zero() {
        let mut p = portfolio();
        let aapl = Symbol::new("AAPL");
        p.apply_buy(&aapl, Quantity::from_i64(100), Money::new(dec!(100)), Money::new(dec!(10000)));
        p.apply_sell(&aapl, Quantity::from_i64(100), Money::new(dec!(110)), Money::new(dec!(11000)))
            .unwrap();
        assert!(p.holding(&aapl).is_none());
        assert_eq!(p.cash_balance().amount(), dec!(101000));
        assert_eq!(p.total_value(), total_of(&p));
    }

    #[test]
    fn oversell_rejected_without_mutation() {
        let mut p = portfolio();
        let aapl = Symbol::new("AAPL");
        p.apply_buy(&aapl, Quantity::from_i64(100), Money::new(dec!(100)), Money::new(dec!(10000)));
        let before = p.clone();

        let err = p
            .apply_sell(&aapl, Quantity::from_i64(150), Money::new(dec!(110)), Money::new(dec!(16500)))
            .unwrap_err();
        assert!(matches!(err, PortfolioError::InsufficientHolding { .. }));
        assert_eq!(p.cash_balance(), before.cash_balance());
        assert_eq!(p.holdings(), before.holdings());
        assert_eq!(p.total_value(), before.total_value());
    }

    #[test]
    fn sell_of_unknown_symbol_rejected() {
        let mut p = portfolio();
        let err = p
            .apply_sell(
                &Symbol::new("MSFT"),
                Quantity::from_i64(1),
                Money::new(dec!(100)),
                Money::new(dec!(100)),
            )
            .unwrap_err();
        assert!(matches!(err, PortfolioError::InsufficientHolding { .. }));
    }

    #[test]
    fn cash_operations_restore_invariant() {
        let mut p = portfolio();
        p.credit_cash(Money::new(dec!(500)));
        assert_eq!(p.cash_balance().amount(), dec!(100500));
        p.debit_cash(Money::new(dec!(1500)));
        assert_eq!(p.cash_balance().amount(), dec!(99000));
        assert_eq!(p.total_value(), total_of(&p));
    }

    #[test]
    fn holdings_keep_insertion_order() {
        let mut p = portfolio();
        p.apply_buy(&Symbol::new("MSFT"), Quantity::from_i64(10), Money::new(dec!(300)), Money::new(dec!(3000)));
        p.apply_buy(&Symbol::new("AAPL"), Quantity::from_i64(10), Money::new(dec!(150)), Money::new(dec!(1500)));
        let symbols: Vec<_> = p.holdings().iter().map(|h| h.symbol().as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "AAPL"]);
    }
}
