//! Holding entity: one instrument position within a portfolio.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{Money, Quantity, Symbol};

/// A position in one instrument, identified by symbol within a portfolio.
///
/// `market_value`, `unrealized_gain`, and `unrealized_gain_pct` are always
/// derived, never authoritative. They are recomputed whenever quantity,
/// average cost, or current price changes, before the owning portfolio's
/// total value is recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    symbol: Symbol,
    quantity: Quantity,
    average_cost: Money,
    current_price: Money,
    market_value: Money,
    unrealized_gain: Money,
    unrealized_gain_pct: Decimal,
}

impl Holding {
    /// Open a new holding from a first lot.
    #[must_use]
    pub fn open(symbol: Symbol, quantity: Quantity, price: Money) -> Self {
        let mut holding = Self {
            symbol,
            quantity,
            average_cost: price,
            current_price: price,
            market_value: Money::ZERO,
            unrealized_gain: Money::ZERO,
            unrealized_gain_pct: Decimal::ZERO,
        };
        holding.refresh_derived();
        holding
    }

    /// Instrument symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Held quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Weighted-average cost basis per unit.
    #[must_use]
    pub const fn average_cost(&self) -> Money {
        self.average_cost
    }

    /// Last observed price per unit.
    #[must_use]
    pub const fn current_price(&self) -> Money {
        self.current_price
    }

    /// Derived market value (quantity * current price).
    #[must_use]
    pub const fn market_value(&self) -> Money {
        self.market_value
    }

    /// Derived unrealized gain/loss (market value - cost basis).
    #[must_use]
    pub const fn unrealized_gain(&self) -> Money {
        self.unrealized_gain
    }

    /// Derived unrealized gain/loss as a percentage of cost basis.
    #[must_use]
    pub const fn unrealized_gain_pct(&self) -> Decimal {
        self.unrealized_gain_pct
    }

    /// Add a lot: increases quantity and recomputes the weighted-average
    /// cost basis. The lot price becomes the current price.
    pub fn add_lot(&mut self, quantity: Quantity, price: Money) {
        let old_basis = self.average_cost * self.quantity.amount();
        let lot_basis = price * quantity.amount();
        let new_quantity = self.quantity + quantity;
        // new_quantity > 0: both inputs are positive quantities
        self.average_cost = Money::new(
            (old_basis + lot_basis).amount() / new_quantity.amount(),
        );
        self.quantity = new_quantity;
        self.current_price = price;
        self.refresh_derived();
    }

    /// Remove quantity from the holding. Average cost is unchanged; the sale
    /// price becomes the current price.
    ///
    /// The caller (the portfolio) checks availability first.
    pub fn remove_quantity(&mut self, quantity: Quantity, price: Money) {
        self.quantity = self.quantity - quantity;
        self.current_price = price;
        self.refresh_derived();
    }

    fn refresh_derived(&mut self) {
        self.market_value = self.current_price * self.quantity.amount();
        let cost_basis = self.average_cost * self.quantity.amount();
        self.unrealized_gain = self.market_value - cost_basis;
        self.unrealized_gain_pct = if cost_basis.is_zero() {
            Decimal::ZERO
        } else {
            self.unrealized_gain.amount() / cost_basis.amount() * Decimal::ONE_HUNDRED
        };
    }
}
